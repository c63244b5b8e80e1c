//! Concept extraction from uploaded papers
//!
//! Sends an uploaded file to the generative endpoint with the fixed
//! extraction prompt and parses the reply into paper metadata suggestions.
//! Everything returned here is a suggestion; the caller must still allow
//! manual override of every field.

use crate::content::PaperContent;
use crate::errors::{AppError, Result};
use crate::genai::{prompts, Generator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Metadata suggestions extracted from a paper.
///
/// All nine fields are required in the model's reply; a field the model
/// could not determine with confidence arrives as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMetadata {
    pub subject_name: String,
    pub subject_code: String,
    pub paper_type: String,
    pub branch: String,
    pub semester: String,
    pub description: String,
    pub tags: String,
    pub college_name: String,
    pub university_name: String,
}

/// Extracts structured metadata from uploaded paper files
pub struct ConceptExtractor {
    generator: Arc<dyn Generator>,
}

impl ConceptExtractor {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Run one extraction over the file's bytes, classifying image vs text
    /// by the file extension.
    pub async fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<ExtractedMetadata> {
        let content = PaperContent::from_bytes(file_name, bytes);

        tracing::info!(
            file_name = file_name,
            kind = ?content.kind,
            size = bytes.len(),
            "Extracting paper metadata"
        );

        let prompt = prompts::extraction_prompt(content.kind);
        let reply = self.generator.generate(&prompt, &[&content]).await?;

        parse_reply(&reply)
    }
}

/// Strip Markdown code-fence wrapping the model sometimes adds despite the
/// prompt's instructions.
fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse the reply as the nine-field JSON object. A reply that is not JSON
/// or is missing any field is a parse failure, never a partial result.
fn parse_reply(raw: &str) -> Result<ExtractedMetadata> {
    let cleaned = strip_code_fences(raw);

    serde_json::from_str(&cleaned).map_err(|e| {
        tracing::warn!(error = %e, raw = raw, "Unparsable extraction reply");
        AppError::ExtractionParse {
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::MockGenerator;

    const FULL_REPLY: &str = r#"{
        "subjectName": "Data Structures",
        "subjectCode": "CS201",
        "paperType": "end-sem",
        "branch": "Computer Science Engineering (CSE)",
        "semester": "3",
        "description": "Covers trees, heaps and graph traversals.",
        "tags": "trees,graphs,heaps",
        "collegeName": "",
        "universityName": ""
    }"#;

    #[test]
    fn test_parse_plain_reply() {
        let parsed = parse_reply(FULL_REPLY).unwrap();
        assert_eq!(parsed.subject_code, "CS201");
        assert_eq!(parsed.college_name, "");
    }

    #[test]
    fn test_parse_strips_code_fences() {
        let fenced = format!("```json\n{}\n```", FULL_REPLY);
        let parsed = parse_reply(&fenced).unwrap();
        assert_eq!(parsed.subject_name, "Data Structures");
    }

    #[test]
    fn test_missing_field_is_parse_failure() {
        // collegeName dropped
        let reply = r#"{
            "subjectName": "DS", "subjectCode": "CS201", "paperType": "end-sem",
            "branch": "IT", "semester": "3", "description": "", "tags": "",
            "universityName": ""
        }"#;
        let err = parse_reply(reply).unwrap_err();
        assert!(matches!(err, AppError::ExtractionParse { .. }));
    }

    #[test]
    fn test_non_json_reply_is_parse_failure() {
        let err = parse_reply("I could not read the paper, sorry.").unwrap_err();
        assert!(matches!(err, AppError::ExtractionParse { .. }));
    }

    #[tokio::test]
    async fn test_extract_sends_one_call() {
        let mock = Arc::new(MockGenerator::new());
        mock.push_reply(FULL_REPLY);

        let extractor = ConceptExtractor::new(mock.clone());
        let parsed = extractor
            .extract("paper.pdf", b"question one: define a stack")
            .await
            .unwrap();

        assert_eq!(parsed.paper_type, "end-sem");
        assert_eq!(mock.calls(), 1);
        assert!(mock.prompts()[0].contains("analyzing a document"));
    }

    #[tokio::test]
    async fn test_extract_classifies_images() {
        let mock = Arc::new(MockGenerator::new());
        mock.push_reply(FULL_REPLY);

        let extractor = ConceptExtractor::new(mock.clone());
        extractor.extract("scan.jpeg", &[0xff, 0xd8]).await.unwrap();

        assert!(mock.prompts()[0].contains("analyzing a image"));
    }
}
