//! Concept extraction handler

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::AppState;
use vaultify_common::{
    errors::{AppError, Result},
    extract::ExtractedMetadata,
};

/// Extract metadata suggestions from an uploaded file.
///
/// Accepts a multipart body with a `file` field and returns the nine-field
/// suggestion object. Parse failures surface as 500 so the client can fall
/// back to manual completion.
pub async fn extract_concepts(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractedMetadata>> {
    let mut file_name = None;
    let mut file_bytes = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::Validation {
        message: format!("Malformed multipart body: {}", e),
    })? {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|n| n.to_string());
            let bytes = field.bytes().await.map_err(|e| AppError::Validation {
                message: format!("Failed to read file field: {}", e),
            })?;
            file_bytes = Some(bytes);
        }
    }

    let bytes = file_bytes.ok_or_else(|| AppError::MissingField {
        field: "file".to_string(),
    })?;
    let name = file_name.unwrap_or_else(|| "upload".to_string());

    let metadata = state.extractor.extract(&name, &bytes).await?;

    Ok(Json(metadata))
}
