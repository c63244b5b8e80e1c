//! Error types for Vaultify services
//!
//! Provides:
//! - Distinct error types for each failure mode in the taxonomy
//! - HTTP status code mapping
//! - A structured JSON response body (`{error, details?, timestamp}`)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    // Resource errors
    #[error("Paper not found: {id}")]
    PaperNotFound { id: String },

    #[error("Paper {id} not found in cache. Please reselect the paper.")]
    PaperNotCached { id: String },

    // Conflict errors
    #[error("A paper for {subject_code} ({academic_year}) with type \"{paper_type}\" already exists")]
    DuplicatePaper {
        subject_code: String,
        academic_year: String,
        paper_type: String,
    },

    // Rate limiting: the local window and the upstream quota are surfaced
    // distinctly so clients can message them differently
    #[error("Rate limit exceeded. Please try again in a minute.")]
    RateLimited,

    #[error("API quota exceeded. Please try again later or upgrade your API plan.")]
    QuotaExceeded,

    // Generative endpoint errors
    #[error("Generation failed: {message}")]
    GenerationFailed { message: String },

    #[error("Failed to parse paper details: {message}")]
    ExtractionParse { message: String },

    // Blob storage errors
    #[error("Blob storage error: {message}")]
    BlobStore { message: String },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. }
            | AppError::MissingField { .. }
            | AppError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::PaperNotFound { .. } | AppError::PaperNotCached { .. } => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict
            AppError::DuplicatePaper { .. } => StatusCode::CONFLICT,

            // 429 Too Many Requests
            AppError::RateLimited | AppError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::ExtractionParse { .. }
            | AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::GenerationFailed { .. }
            | AppError::BlobStore { .. }
            | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for the API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                status = status.as_u16(),
                "Client error"
            );
        }

        let details = match &self {
            AppError::Database(e) => Some(e.to_string()),
            AppError::HttpClient(e) => Some(e.to_string()),
            _ => None,
        };

        let body = ErrorResponse {
            error: message,
            details,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = AppError::PaperNotCached { id: "abc".into() };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = AppError::DuplicatePaper {
            subject_code: "CS201".into(),
            academic_year: "2023-24".into(),
            paper_type: "end-sem".into(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_rate_errors_map_to_429() {
        assert_eq!(AppError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(AppError::QuotaExceeded.status_code(), StatusCode::TOO_MANY_REQUESTS);
        // Distinct user messaging for the two cases
        assert_ne!(AppError::RateLimited.to_string(), AppError::QuotaExceeded.to_string());
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::MissingField { field: "subjectCode".into() };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_server_error());
        assert!(err.is_client_error());
    }

    #[test]
    fn test_server_error() {
        let err = AppError::Internal { message: "boom".into() };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
    }
}
