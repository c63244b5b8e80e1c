//! Prompt templates for the generative endpoint
//!
//! The instructions sent to the model are data, not logic. They live here as
//! named constants with interpolation points so they can be iterated on
//! without touching control flow.

use crate::content::MediaKind;

/// Nine metadata fields the extraction reply must contain, in reply order.
pub const EXTRACTION_FIELDS: [&str; 9] = [
    "subjectName",
    "subjectCode",
    "paperType",
    "branch",
    "semester",
    "description",
    "tags",
    "collegeName",
    "universityName",
];

/// Instruction prompt for structured metadata extraction.
/// `{noun}` is "image" or "document" depending on content class.
const EXTRACTION_TEMPLATE: &str = r#"You are a professional study assistant analyzing a {noun} of an academic paper.

Please analyze the content and extract the following information in a structured format.

IMPORTANT: Return ONLY the raw JSON object without any markdown formatting, code blocks, or additional text.

Extract these fields:
1. Subject Name (e.g., "Data Structures", "Computer Networks")
2. Subject Code (e.g., "CS201", "IT301")
3. Paper Type (one of: "end-sem", "mid-semester-test 1", "mid-semester-test 2", "other")
4. Branch (one of: "Computer Science Engineering (CSE)", "Information Technology (IT)", "Electronics & Communication (EC)", "Electrical Engineering (EE)", "Mechanical Engineering (ME)", "Civil Engineering (CE)", "Chemical Engineering (CHE)", "Biotechnology (BT)", "Artificial Intelligence (AI)", "Data Science (DS)", "Cyber Security (CS)", "Other")
5. Semester (1-8)
6. Description (a brief 1-2 sentence description of the paper content)
7. Tags (comma-separated keywords)
8. College Name (e.g., "MIT College of Engineering", "COEP Technological University")
9. University Name (e.g., "Savitribai Phule Pune University", "Mumbai University")

Return EXACTLY this JSON structure with no additional text or formatting:
{
  "subjectName": "",
  "subjectCode": "",
  "paperType": "",
  "branch": "",
  "semester": "",
  "description": "",
  "tags": "",
  "collegeName": "",
  "universityName": ""
}

If you cannot determine any field with high confidence, leave it as an empty string. Do not make assumptions. Only include information that is clearly present in the content."#;

/// Per-paper summary prompt used while selecting papers.
/// `{noun}` is "image" or "document" depending on content class.
const PAPER_SUMMARY_TEMPLATE: &str = r#"You are a professional study assistant who has just received a {noun} of an academic exam paper to analyze.

Please analyze the content thoroughly and produce a short summary that:
1. Names the subject the paper covers
2. Mentions 2-3 key topics or question areas it contains
3. Stays under one paragraph

Keep the summary factual and plain. Avoid using any special formatting characters or markdown syntax."#;

/// Combined overview prompt issued once after per-paper summaries.
const OVERVIEW_TEMPLATE: &str = r#"You are a professional study assistant. A student has just selected the study material summarized below.

Please provide a welcoming, professional response that:
1. Starts with a warm greeting acknowledging that you've analyzed their material
2. Briefly mentions the key topics you've identified across all papers, incorporating them naturally into your response
3. Maintains a professional yet approachable tone
4. Concludes by asking how you can help them study this material

Keep the response conversational and encouraging, but maintain a professional tone throughout. Avoid using any special formatting characters or markdown syntax.

Paper summaries:
"#;

/// Question-answering prompt. The assembled paper contents follow the
/// formatting rules so the reply stays renderable as plain prose.
const QUESTION_TEMPLATE: &str = r#"You are a professional study assistant helping a student understand their course material.
The student asks: "{question}"

Please provide a clear, well-structured response that:
1. Uses natural, professional language (no markdown formatting like **, ##, or bullet points)
2. Organizes information in clear paragraphs
3. Uses proper transitions between ideas
4. Numbers any lists or steps naturally (e.g., "First," "Second," "Third," or "The first advantage...")
5. Maintains a professional yet conversational tone
6. Uses indentation for sub-points (using spaces, not special characters)

When listing multiple items:
- Start with an introductory sentence
- Present each item as a complete sentence or paragraph
- Use proper transitions between items
- Conclude with a summary if appropriate

Based on the content:
{body}"#;

/// Build the extraction prompt for the given content class.
pub fn extraction_prompt(kind: MediaKind) -> String {
    EXTRACTION_TEMPLATE.replace("{noun}", kind.noun())
}

/// Build the per-paper summary prompt for the given content class.
pub fn paper_summary_prompt(kind: MediaKind) -> String {
    PAPER_SUMMARY_TEMPLATE.replace("{noun}", kind.noun())
}

/// Build the combined overview prompt over concatenated summaries.
pub fn combined_overview_prompt(summaries: &str) -> String {
    format!("{}{}", OVERVIEW_TEMPLATE, summaries)
}

/// Build the question prompt over the assembled content body.
pub fn question_prompt(question: &str, body: &str) -> String {
    QUESTION_TEMPLATE
        .replace("{question}", question)
        .replace("{body}", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_interpolates_noun() {
        let text = extraction_prompt(MediaKind::Text);
        assert!(text.contains("analyzing a document"));

        let image = extraction_prompt(MediaKind::Image);
        assert!(image.contains("analyzing a image"));
    }

    #[test]
    fn test_extraction_prompt_names_all_fields() {
        let prompt = extraction_prompt(MediaKind::Text);
        for field in EXTRACTION_FIELDS {
            assert!(prompt.contains(field), "missing field {field}");
        }
    }

    #[test]
    fn test_question_prompt_embeds_question_and_body() {
        let prompt = question_prompt("What is a B-tree?", "Paper 1:\nsome content");
        assert!(prompt.contains("\"What is a B-tree?\""));
        assert!(prompt.contains("Paper 1:\nsome content"));
        assert!(!prompt.contains("{question}"));
        assert!(!prompt.contains("{body}"));
    }

    #[test]
    fn test_overview_prompt_appends_summaries() {
        let prompt = combined_overview_prompt("Paper 1: sorting algorithms");
        assert!(prompt.ends_with("Paper 1: sorting algorithms"));
    }
}
