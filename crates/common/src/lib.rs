//! Vaultify Common Library
//!
//! Shared code for the Vaultify services including:
//! - Paper entity and repository (metadata store access, duplicate checking)
//! - Blob storage client
//! - Generative-AI client with request quota enforcement
//! - Content cache for fetched paper payloads
//! - Concept extraction and study-assistant orchestration
//! - Error types, configuration, and metrics

pub mod assistant;
pub mod cache;
pub mod config;
pub mod content;
pub mod db;
pub mod errors;
pub mod extract;
pub mod genai;
pub mod metrics;
pub mod storage;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};
pub use genai::Generator;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default model for text content (cheaper, faster)
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default model for image content (heavier, better vision)
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-pro";
