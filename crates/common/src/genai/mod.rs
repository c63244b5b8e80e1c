//! Generative-AI client
//!
//! Provides a unified interface to the external generative endpoint:
//! - `Generator` trait as the seam for orchestration code and tests
//! - `GeminiClient` speaking the hosted wire format
//! - `MockGenerator` with scripted replies for tests
//!
//! Every generation call passes the process-wide `RequestQuota` gate before
//! touching the network; a denial surfaces as a rate-limit error, distinct
//! from upstream quota exhaustion (HTTP 429 from the endpoint).

pub mod prompts;
mod quota;

pub use quota::RequestQuota;

use crate::config::GenAiConfig;
use crate::content::PaperContent;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for text generation over optional content attachments
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a reply for a prompt.
    ///
    /// Image attachments travel as inline data parts; text attachments are
    /// appended to the prompt body. Attachment order is preserved.
    async fn generate(&self, prompt: &str, attachments: &[&PaperContent]) -> Result<String>;
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    code: Option<i64>,
    message: Option<String>,
}

// ============================================================================
// Hosted client
// ============================================================================

/// Client for the hosted generative endpoint
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    text_model: String,
    image_model: String,
    quota: Arc<RequestQuota>,
}

impl GeminiClient {
    /// Create a new client from configuration, sharing the given quota.
    pub fn new(config: &GenAiConfig, quota: Arc<RequestQuota>) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| AppError::Configuration {
            message: "genai.api_key is required".to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            quota,
        })
    }

    /// Pick the model variant for this call: any image attachment selects
    /// the heavier vision model, text-only calls the lighter one.
    fn model_for(&self, attachments: &[&PaperContent]) -> &str {
        if attachments.iter().any(|c| c.is_image()) {
            &self.image_model
        } else {
            &self.text_model
        }
    }

    fn build_parts(prompt: &str, attachments: &[&PaperContent]) -> Vec<Part> {
        let mut parts = Vec::new();
        let mut text = prompt.to_string();

        for content in attachments {
            if content.is_image() {
                parts.push(Part::InlineData {
                    inline_data: InlineData {
                        mime_type: content.mime_type.clone(),
                        data: content.data.clone(),
                    },
                });
            } else {
                text.push_str("\n\nContent to analyze:\n");
                text.push_str(&content.data);
            }
        }

        parts.push(Part::Text { text });
        parts
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str, attachments: &[&PaperContent]) -> Result<String> {
        if !self.quota.try_acquire() {
            return Err(AppError::RateLimited);
        }

        let model = self.model_for(attachments);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: Self::build_parts(prompt, attachments),
            }],
        };

        tracing::debug!(
            model = model,
            attachments = attachments.len(),
            "Sending generation request"
        );

        let start = Instant::now();
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            metrics::record_generation(start.elapsed().as_secs_f64(), model, false);

            let body: ApiErrorBody = response.json().await.unwrap_or(ApiErrorBody { error: None });
            let detail = body.error.unwrap_or(ApiErrorDetail { code: None, message: None });

            // Quota exhaustion warrants different user messaging than a
            // generic upstream failure
            if detail.code == Some(429) {
                return Err(AppError::QuotaExceeded);
            }

            return Err(AppError::GenerationFailed {
                message: detail
                    .message
                    .unwrap_or_else(|| format!("endpoint returned {}", status)),
            });
        }

        let data: GenerateResponse = response.json().await?;
        metrics::record_generation(start.elapsed().as_secs_f64(), model, true);

        data.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| AppError::GenerationFailed {
                message: "Invalid response format from generative endpoint".to_string(),
            })
    }
}

// ============================================================================
// Mock generator for tests
// ============================================================================

/// Mock generator with scripted replies, recording every prompt it receives.
pub struct MockGenerator {
    prompts: std::sync::Mutex<Vec<String>>,
    replies: std::sync::Mutex<std::collections::VecDeque<String>>,
    quota: Option<Arc<RequestQuota>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            prompts: std::sync::Mutex::new(Vec::new()),
            replies: std::sync::Mutex::new(std::collections::VecDeque::new()),
            quota: None,
        }
    }

    /// Gate calls through a quota, like the real client.
    pub fn with_quota(quota: Arc<RequestQuota>) -> Self {
        Self {
            quota: Some(quota),
            ..Self::new()
        }
    }

    /// Queue a scripted reply. When the queue is empty a fixed placeholder
    /// reply is returned instead.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(reply.into());
    }

    /// Number of generation calls that were admitted
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str, _attachments: &[&PaperContent]) -> Result<String> {
        if let Some(quota) = &self.quota {
            if !quota.try_acquire() {
                return Err(AppError::RateLimited);
            }
        }

        self.prompts.lock().unwrap().push(prompt.to_string());

        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "mock reply".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PaperContent;

    #[test]
    fn test_build_parts_text_only() {
        let content = PaperContent::from_bytes("notes.txt", b"some text");
        let parts = GeminiClient::build_parts("analyze this", &[&content]);

        assert_eq!(parts.len(), 1);
        let json = serde_json::to_value(&parts[0]).unwrap();
        let text = json["text"].as_str().unwrap();
        assert!(text.starts_with("analyze this"));
        assert!(text.contains("Content to analyze:\nsome text"));
    }

    #[test]
    fn test_build_parts_image_precedes_prompt() {
        let content = PaperContent::from_bytes("scan.jpg", &[0xff, 0xd8]);
        let parts = GeminiClient::build_parts("analyze this", &[&content]);

        assert_eq!(parts.len(), 2);
        let inline = serde_json::to_value(&parts[0]).unwrap();
        assert_eq!(inline["inlineData"]["mimeType"], "image/jpeg");
        let text = serde_json::to_value(&parts[1]).unwrap();
        assert_eq!(text["text"], "analyze this");
    }

    #[tokio::test]
    async fn test_mock_generator_scripted_replies() {
        let mock = MockGenerator::new();
        mock.push_reply("first");

        assert_eq!(mock.generate("p1", &[]).await.unwrap(), "first");
        assert_eq!(mock.generate("p2", &[]).await.unwrap(), "mock reply");
        assert_eq!(mock.calls(), 2);
        assert_eq!(mock.prompts(), vec!["p1".to_string(), "p2".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_generator_respects_quota() {
        let quota = Arc::new(RequestQuota::new(1));
        let mock = MockGenerator::with_quota(quota);

        assert!(mock.generate("p1", &[]).await.is_ok());
        let err = mock.generate("p2", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited));
        assert_eq!(mock.calls(), 1);
    }
}
