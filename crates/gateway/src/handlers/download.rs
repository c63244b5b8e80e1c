//! Download proxy handler
//!
//! Fetches a stored file server-side and streams it back with an
//! attachment disposition, so the browser saves instead of navigating to
//! the storage URL.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::AppState;
use vaultify_common::errors::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub url: Option<String>,
    pub name: Option<String>,
}

/// Proxy a stored file back to the client as an attachment.
///
/// 400 when `url` is missing; an upstream fetch failure propagates the
/// upstream status.
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    let url = query.url.as_deref().ok_or_else(|| AppError::MissingField {
        field: "url".to_string(),
    })?;
    let file_name = query.name.as_deref().unwrap_or("paper.pdf");

    let upstream = state.http.get(url).send().await?;

    if !upstream.status().is_success() {
        tracing::warn!(url = url, status = %upstream.status(), "Upstream fetch failed");
        let status = StatusCode::from_u16(upstream.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        return Ok((status, "Failed to fetch the file from storage").into_response());
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/pdf")
        .to_string();

    let body = Body::from_stream(upstream.bytes_stream());

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(body)
        .map_err(|e| AppError::Internal {
            message: format!("Failed to build download response: {}", e),
        })?;

    Ok(response)
}
