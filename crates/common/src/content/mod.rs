//! Paper content classification and payload types
//!
//! Uploaded papers are either images (photographed pages) or text-like
//! documents. The class decides both the payload encoding (base64 vs UTF-8)
//! and which model variant handles the content.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Extensions treated as image content
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Content class of a paper payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Text,
}

impl MediaKind {
    /// Classify by file extension: {jpg, jpeg, png} are images,
    /// everything else is treated as UTF-8 text.
    pub fn from_extension(ext: &str) -> Self {
        if IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            MediaKind::Image
        } else {
            MediaKind::Text
        }
    }

    /// Classify from a file name or URL path.
    pub fn from_file_name(name: &str) -> Self {
        Self::from_extension(&file_extension(name))
    }

    pub fn is_image(&self) -> bool {
        matches!(self, MediaKind::Image)
    }

    /// Human-readable noun used in prompt templates
    pub fn noun(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Text => "document",
        }
    }
}

/// Extract the lowercase extension from a file name or URL,
/// ignoring any query string.
pub fn file_extension(name_or_url: &str) -> String {
    let without_query = name_or_url.split('?').next().unwrap_or("");
    let file_name = without_query.rsplit('/').next().unwrap_or("");
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// A fetched paper payload, ready to hand to the generative endpoint.
///
/// Image payloads hold base64 data; text payloads hold the decoded UTF-8
/// string. Both carry the MIME type guessed from the file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperContent {
    pub data: String,
    pub kind: MediaKind,
    pub mime_type: String,
}

impl PaperContent {
    /// Build content from raw bytes, classifying by the file name or URL.
    ///
    /// Text payloads are decoded lossily; papers are user uploads and a
    /// stray invalid byte should not fail the whole flow.
    pub fn from_bytes(name_or_url: &str, bytes: &[u8]) -> Self {
        let kind = MediaKind::from_file_name(name_or_url);
        let mime_type = guess_mime(name_or_url);

        let data = match kind {
            MediaKind::Image => base64::engine::general_purpose::STANDARD.encode(bytes),
            MediaKind::Text => String::from_utf8_lossy(bytes).into_owned(),
        };

        Self { data, kind, mime_type }
    }

    pub fn is_image(&self) -> bool {
        self.kind.is_image()
    }
}

/// Guess the MIME type from a file name or URL (query string ignored).
pub fn guess_mime(name_or_url: &str) -> String {
    let without_query = name_or_url.split('?').next().unwrap_or("");
    mime_guess::from_path(without_query)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions() {
        assert_eq!(MediaKind::from_extension("jpg"), MediaKind::Image);
        assert_eq!(MediaKind::from_extension("JPEG"), MediaKind::Image);
        assert_eq!(MediaKind::from_extension("png"), MediaKind::Image);
        assert_eq!(MediaKind::from_extension("pdf"), MediaKind::Text);
        assert_eq!(MediaKind::from_extension("txt"), MediaKind::Text);
        assert_eq!(MediaKind::from_extension(""), MediaKind::Text);
    }

    #[test]
    fn test_extension_from_url_strips_query() {
        let url = "https://storage.example.com/papers/CS201_2023-24_17.png?alt=media&token=abc";
        assert_eq!(file_extension(url), "png");
        assert_eq!(MediaKind::from_file_name(url), MediaKind::Image);
    }

    #[test]
    fn test_extension_missing() {
        assert_eq!(file_extension("https://example.com/papers/noext"), "");
        assert_eq!(MediaKind::from_file_name("noext"), MediaKind::Text);
    }

    #[test]
    fn test_text_content_decodes_utf8() {
        let content = PaperContent::from_bytes("notes.txt", "derivatives and integrals".as_bytes());
        assert_eq!(content.kind, MediaKind::Text);
        assert_eq!(content.data, "derivatives and integrals");
        assert_eq!(content.mime_type, "text/plain");
    }

    #[test]
    fn test_image_content_encodes_base64() {
        let bytes = [0x89u8, 0x50, 0x4e, 0x47];
        let content = PaperContent::from_bytes("scan.png", &bytes);
        assert_eq!(content.kind, MediaKind::Image);
        assert_eq!(content.mime_type, "image/png");

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&content.data)
            .unwrap();
        assert_eq!(decoded, bytes);
    }
}
