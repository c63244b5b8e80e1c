//! Study assistant handler
//!
//! One POST endpoint dispatching on an `action` discriminator, mirroring
//! the conversational client: `select_papers` loads content and returns the
//! opening insights, `ask_question` answers over already-loaded papers.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use vaultify_common::{
    assistant::PaperSelection,
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPaperInput {
    pub id: Uuid,
    pub file_url: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AskPaperInput {
    pub id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SelectPapersRequest {
    #[validate(length(min = 1, message = "At least one paper is required"))]
    pub papers: Vec<SelectPaperInput>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AskQuestionRequest {
    #[validate(length(min = 1, message = "At least one paper is required"))]
    pub papers: Vec<AskPaperInput>,
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPapersResponse {
    pub message: String,
    pub processed_papers: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_insights: Option<String>,
}

#[derive(Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Study assistant entry point
pub async fn study_assistant(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response> {
    let action = body
        .get("action")
        .and_then(|a| a.as_str())
        .unwrap_or_default()
        .to_string();

    match action.as_str() {
        "select_papers" => {
            let request: SelectPapersRequest =
                serde_json::from_value(body).map_err(|e| AppError::Validation {
                    message: format!("Invalid select_papers request: {}", e),
                })?;
            select_papers(&state, request).await
        }
        "ask_question" => {
            let request: AskQuestionRequest =
                serde_json::from_value(body).map_err(|e| AppError::Validation {
                    message: format!("Invalid ask_question request: {}", e),
                })?;
            ask_question(&state, request).await
        }
        _ => Err(AppError::Validation {
            message: "Invalid action".to_string(),
        }),
    }
}

async fn select_papers(state: &AppState, request: SelectPapersRequest) -> Result<Response> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
    })?;

    let refs: Vec<PaperSelection> = request
        .papers
        .into_iter()
        .map(|p| PaperSelection {
            id: p.id,
            file_url: p.file_url,
        })
        .collect();

    let outcome = state.assistant.select_papers(&refs).await?;

    let message = if outcome.processed.is_empty() {
        "Papers already processed".to_string()
    } else {
        "Papers processed successfully".to_string()
    };

    tracing::info!(
        processed = outcome.processed.len(),
        "Study assistant selection completed"
    );

    Ok(Json(SelectPapersResponse {
        message,
        processed_papers: outcome.processed,
        initial_insights: outcome.initial_insights,
    })
    .into_response())
}

async fn ask_question(state: &AppState, request: AskQuestionRequest) -> Result<Response> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
    })?;

    let question = request
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::MissingField {
            field: "question".to_string(),
        })?;

    let ids: Vec<Uuid> = request.papers.iter().map(|p| p.id).collect();
    let answer = state.assistant.ask_question(&ids, question).await?;

    Ok(Json(AnswerResponse { answer }).into_response())
}
