//! Study assistant orchestration
//!
//! Coordinates cache fills, quota-gated generation calls, and prompt
//! assembly for the chat feature. Content must be explicitly selected
//! before it can be queried: `ask_question` never fetches, it only reads
//! the cache, so a stale reference surfaces as "reselect the paper".

use crate::cache::ContentCache;
use crate::content::PaperContent;
use crate::errors::{AppError, Result};
use crate::genai::{prompts, Generator};
use crate::storage::BlobStore;
use std::sync::Arc;
use uuid::Uuid;

/// Reference to a paper being selected for study
#[derive(Debug, Clone)]
pub struct PaperSelection {
    pub id: Uuid,
    pub file_url: String,
}

/// Result of a selection round
#[derive(Debug)]
pub struct SelectionOutcome {
    /// Papers that were newly fetched and summarized this round
    pub processed: Vec<Uuid>,
    /// Combined conversational overview; `None` when every paper was
    /// already cached and no generation call was made
    pub initial_insights: Option<String>,
}

/// Orchestrates the study-assistant flows
pub struct StudyAssistant {
    cache: Arc<ContentCache>,
    store: Arc<dyn BlobStore>,
    generator: Arc<dyn Generator>,
}

impl StudyAssistant {
    pub fn new(
        cache: Arc<ContentCache>,
        store: Arc<dyn BlobStore>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            cache,
            store,
            generator,
        }
    }

    /// Load the given papers into the cache and produce a combined overview.
    ///
    /// Papers are processed sequentially in list order: one fetch plus one
    /// summary call per uncached paper, then a single combined-overview call.
    /// Sequential processing keeps behavior deterministic and avoids blowing
    /// the quota window in a burst. A quota denial anywhere fails the whole
    /// operation.
    pub async fn select_papers(&self, refs: &[PaperSelection]) -> Result<SelectionOutcome> {
        let mut summaries = Vec::new();
        let mut processed = Vec::new();

        for selection in refs {
            if self.cache.contains(selection.id) {
                tracing::debug!(paper_id = %selection.id, "Paper already processed");
                continue;
            }

            let bytes = self.store.fetch(&selection.file_url).await?;
            let content = PaperContent::from_bytes(&selection.file_url, &bytes);

            if content.data.is_empty() {
                return Err(AppError::BlobStore {
                    message: format!(
                        "Failed to extract content from {}",
                        selection.file_url
                    ),
                });
            }

            self.cache.put(selection.id, content.clone());

            let summary = self
                .generator
                .generate(&prompts::paper_summary_prompt(content.kind), &[&content])
                .await?;

            tracing::info!(paper_id = %selection.id, kind = ?content.kind, "Paper processed");

            summaries.push(summary);
            processed.push(selection.id);
        }

        if processed.is_empty() {
            return Ok(SelectionOutcome {
                processed,
                initial_insights: None,
            });
        }

        let joined = summaries
            .iter()
            .enumerate()
            .map(|(i, s)| format!("Paper {}: {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n\n");

        let overview = self
            .generator
            .generate(&prompts::combined_overview_prompt(&joined), &[])
            .await?;

        Ok(SelectionOutcome {
            processed,
            initial_insights: Some(overview),
        })
    }

    /// Answer a question over previously selected papers.
    ///
    /// Every referenced paper must already be cached; text contents are
    /// inlined into the prompt body under paper-identifying headers, image
    /// contents ride along as attachments.
    pub async fn ask_question(&self, ids: &[Uuid], question: &str) -> Result<String> {
        let mut contents = Vec::with_capacity(ids.len());
        for id in ids {
            let content = self
                .cache
                .get(*id)
                .ok_or_else(|| AppError::PaperNotCached { id: id.to_string() })?;
            contents.push((*id, content));
        }

        let mut body = String::new();
        for (i, (id, content)) in contents.iter().enumerate() {
            if content.is_image() {
                body.push_str(&format!("Paper {} ({}) is attached as an image.\n\n", i + 1, id));
            } else {
                body.push_str(&format!("Paper {} ({}):\n{}\n\n", i + 1, id, content.data));
            }
        }

        let attachments: Vec<&PaperContent> = contents
            .iter()
            .filter(|(_, c)| c.is_image())
            .map(|(_, c)| c)
            .collect();

        let prompt = prompts::question_prompt(question, body.trim_end());
        self.generator.generate(&prompt, &attachments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::{MockGenerator, RequestQuota};
    use crate::storage::MemoryBlobStore;

    fn setup(quota: Option<Arc<RequestQuota>>) -> (StudyAssistant, Arc<MockGenerator>, Arc<MemoryBlobStore>) {
        let cache = Arc::new(ContentCache::new(16));
        let store = Arc::new(MemoryBlobStore::new());
        let generator = Arc::new(match quota {
            Some(q) => MockGenerator::with_quota(q),
            None => MockGenerator::new(),
        });

        let assistant = StudyAssistant::new(cache, store.clone(), generator.clone());
        (assistant, generator, store)
    }

    fn seed_paper(store: &MemoryBlobStore, name: &str, body: &str) -> PaperSelection {
        let url = format!("memory://papers/{}", name);
        store.insert(url.clone(), body.as_bytes().to_vec());
        PaperSelection {
            id: Uuid::new_v4(),
            file_url: url,
        }
    }

    #[tokio::test]
    async fn test_select_two_unseen_papers_makes_three_calls() {
        let (assistant, generator, store) = setup(None);
        let a = seed_paper(&store, "a.txt", "sorting algorithms");
        let b = seed_paper(&store, "b.txt", "graph theory");

        generator.push_reply("summary of a");
        generator.push_reply("summary of b");
        generator.push_reply("combined overview");

        let outcome = assistant
            .select_papers(&[a.clone(), b.clone()])
            .await
            .unwrap();

        assert_eq!(outcome.processed, vec![a.id, b.id]);
        assert_eq!(outcome.initial_insights.as_deref(), Some("combined overview"));
        // Two per-paper summaries plus one combined overview
        assert_eq!(generator.calls(), 3);

        let prompts = generator.prompts();
        assert!(prompts[2].contains("Paper 1: summary of a"));
        assert!(prompts[2].contains("Paper 2: summary of b"));
    }

    #[tokio::test]
    async fn test_reselection_makes_no_calls() {
        let (assistant, generator, store) = setup(None);
        let a = seed_paper(&store, "a.txt", "sorting algorithms");

        assistant.select_papers(&[a.clone()]).await.unwrap();
        assert_eq!(generator.calls(), 2);

        let outcome = assistant.select_papers(&[a]).await.unwrap();
        assert!(outcome.processed.is_empty());
        assert!(outcome.initial_insights.is_none());
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_quota_denial_fails_selection() {
        // Two slots: both summaries admitted, the overview call is denied
        let quota = Arc::new(RequestQuota::new(2));
        let (assistant, _generator, store) = setup(Some(quota));
        let a = seed_paper(&store, "a.txt", "sorting algorithms");
        let b = seed_paper(&store, "b.txt", "graph theory");

        let err = assistant.select_papers(&[a, b]).await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited));
    }

    #[tokio::test]
    async fn test_ask_question_requires_cached_papers() {
        let (assistant, generator, _store) = setup(None);
        let unknown = Uuid::new_v4();

        let err = assistant.ask_question(&[unknown], "what is this?").await.unwrap_err();
        assert!(matches!(err, AppError::PaperNotCached { .. }));
        // No generation call was made
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_ask_question_after_selection_makes_one_call() {
        let (assistant, generator, store) = setup(None);
        let a = seed_paper(&store, "a.txt", "sorting algorithms");
        let b = seed_paper(&store, "b.txt", "graph theory");

        assistant.select_papers(&[a.clone(), b.clone()]).await.unwrap();
        assert_eq!(generator.calls(), 3);

        generator.push_reply("the answer");
        let answer = assistant
            .ask_question(&[a.id, b.id], "Compare the two papers")
            .await
            .unwrap();

        assert_eq!(answer, "the answer");
        assert_eq!(generator.calls(), 4);

        let prompt = generator.prompts().pop().unwrap();
        assert!(prompt.contains("Compare the two papers"));
        assert!(prompt.contains(&format!("Paper 1 ({})", a.id)));
        assert!(prompt.contains("sorting algorithms"));
        assert!(prompt.contains("graph theory"));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let (assistant, generator, _store) = setup(None);
        let missing = PaperSelection {
            id: Uuid::new_v4(),
            file_url: "memory://papers/gone.txt".to_string(),
        };

        let err = assistant.select_papers(&[missing]).await.unwrap_err();
        assert!(matches!(err, AppError::BlobStore { .. }));
        assert_eq!(generator.calls(), 0);
    }
}
