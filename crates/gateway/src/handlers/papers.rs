//! Paper listing and upload handlers

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use vaultify_common::{
    content,
    db::models::Paper,
    db::{NewPaper, PaperFilter},
    errors::{AppError, Result},
    metrics,
};

/// Branches a paper can belong to; "Other" takes a free-text override
const BRANCHES: &[&str] = &[
    "Computer Science Engineering (CSE)",
    "Computer Science and Information Technology (CSIT)",
    "Information Technology (IT)",
    "Electronics & Communication (EC)",
    "Electrical Engineering (EE)",
    "Mechanical Engineering (ME)",
    "Civil Engineering (CE)",
    "Chemical Engineering (CHE)",
    "Biotechnology (BT)",
    "Artificial Intelligence (AI)",
    "Data Science (DS)",
    "Cyber Security (CS)",
    "Other",
];

/// Known paper types; "other" takes a free-text override
const PAPER_TYPES: &[&str] = &["end-sem", "mid-semester-test 1", "mid-semester-test 2", "other"];

/// Fields the upload form must carry
const REQUIRED_FIELDS: &[&str] = &[
    "subjectName",
    "subjectCode",
    "semester",
    "academicYear",
    "branch",
    "paperType",
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPapersQuery {
    pub branch: Option<String>,
    pub semester: Option<String>,
    pub academic_year: Option<String>,
    pub paper_type: Option<String>,
    /// Case-insensitive substring search over subject name/code,
    /// description, and tags
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct ListPapersResponse {
    pub papers: Vec<Paper>,
    pub message: String,
}

/// List papers, newest first, with optional filters
pub async fn list_papers(
    State(state): State<AppState>,
    Query(query): Query<ListPapersQuery>,
) -> Result<Json<ListPapersResponse>> {
    let filter = PaperFilter {
        branch: query.branch,
        semester: query.semester,
        academic_year: query.academic_year,
        paper_type: query.paper_type,
    };

    let mut papers = state.repo.list_papers(&filter).await?;

    if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
        let needle = q.to_lowercase();
        papers.retain(|paper| {
            paper.subject_name.to_lowercase().contains(&needle)
                || paper.subject_code.to_lowercase().contains(&needle)
                || paper
                    .description
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(&needle)
                || paper
                    .tags
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(&needle)
        });
    }

    let message = if papers.is_empty() {
        "No papers found".to_string()
    } else {
        "Papers fetched successfully".to_string()
    };

    Ok(Json(ListPapersResponse { papers, message }))
}

/// Get a paper by ID
pub async fn get_paper(
    State(state): State<AppState>,
    Path(paper_id): Path<Uuid>,
) -> Result<Json<Paper>> {
    let paper = state
        .repo
        .find_paper_by_id(paper_id)
        .await?
        .ok_or_else(|| AppError::PaperNotFound {
            id: paper_id.to_string(),
        })?;

    Ok(Json(paper))
}

/// Accumulated multipart form state
#[derive(Default)]
struct UploadForm {
    fields: std::collections::HashMap<String, String>,
    file_name: Option<String>,
    file_bytes: Option<Vec<u8>>,
}

impl UploadForm {
    fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    fn require(&self, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| AppError::MissingField {
            field: name.to_string(),
        })
    }
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::Validation {
        message: format!("Malformed multipart body: {}", e),
    })? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            form.file_name = field.file_name().map(|n| n.to_string());
            let bytes = field.bytes().await.map_err(|e| AppError::Validation {
                message: format!("Failed to read file field: {}", e),
            })?;
            form.file_bytes = Some(bytes.to_vec());
        } else {
            let value = field.text().await.map_err(|e| AppError::Validation {
                message: format!("Failed to read field {}: {}", name, e),
            })?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Upload a paper: validate, check for duplicates, store the file, persist
/// the record.
///
/// The duplicate check runs before any write; a failed check aborts the
/// whole upload. The check and the insert are not atomic, so two concurrent
/// uploads of the same tuple can still both land.
pub async fn upload_paper(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Paper>)> {
    let form = read_form(multipart).await?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|f| form.get(f).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation {
            message: format!("Please fill in all required fields: {}", missing.join(", ")),
        });
    }

    let file_bytes = form.file_bytes.as_deref().ok_or_else(|| AppError::MissingField {
        field: "file".to_string(),
    })?;
    let original_name = form.file_name.as_deref().unwrap_or("paper.pdf");

    let subject_name = form.require("subjectName")?.to_string();
    let subject_code = form.require("subjectCode")?.to_string();
    let semester = form.require("semester")?.to_string();
    let academic_year = form.require("academicYear")?.to_string();
    let mut branch = form.require("branch")?.to_string();
    let mut paper_type = form.require("paperType")?.to_string();

    validate_semester(&semester)?;
    validate_academic_year(&academic_year)?;

    if !BRANCHES.contains(&branch.as_str()) {
        return Err(AppError::InvalidFormat {
            message: format!("Unknown branch: {}", branch),
        });
    }
    if !PAPER_TYPES.contains(&paper_type.as_str()) {
        return Err(AppError::InvalidFormat {
            message: format!("Unknown paper type: {}", paper_type),
        });
    }

    // Free-text overrides replace the sentinel values
    let mut custom_branch = None;
    if branch == "Other" {
        let custom = form.require("customBranch")?.to_string();
        custom_branch = Some(custom.clone());
        branch = custom;
    }

    let mut custom_paper_type = None;
    if paper_type == "other" {
        let custom = form.require("customPaperType")?.to_string();
        custom_paper_type = Some(custom.clone());
        paper_type = custom;
    }

    // Pre-flight duplicate check; a store error aborts the upload entirely
    if state
        .repo
        .is_duplicate(&subject_code, &academic_year, &paper_type)
        .await?
    {
        metrics::record_upload(true);
        return Err(AppError::DuplicatePaper {
            subject_code,
            academic_year,
            paper_type,
        });
    }

    let extension = {
        let ext = content::file_extension(original_name);
        if ext.is_empty() { "pdf".to_string() } else { ext }
    };
    let file_name = format!(
        "{}_{}_{}.{}",
        subject_code,
        academic_year,
        chrono::Utc::now().timestamp_millis(),
        extension
    );
    let path = format!("papers/{}", file_name);
    let content_type = content::guess_mime(&file_name);

    let file_size = file_bytes.len() as i64;
    let file_url = state
        .storage
        .store(&path, file_bytes.to_vec(), &content_type)
        .await?;

    let paper = state
        .repo
        .save_paper(NewPaper {
            subject_name,
            subject_code,
            paper_type,
            branch,
            custom_branch,
            custom_paper_type,
            semester,
            academic_year,
            description: form.get("description").map(|v| v.to_string()),
            tags: form.get("tags").map(|v| v.to_string()),
            file_name,
            file_url,
            file_size,
        })
        .await?;

    metrics::record_upload(false);
    tracing::info!(
        paper_id = %paper.id,
        subject_code = %paper.subject_code,
        academic_year = %paper.academic_year,
        paper_type = %paper.paper_type,
        "Paper uploaded"
    );

    Ok((StatusCode::CREATED, Json(paper)))
}

fn validate_semester(semester: &str) -> Result<()> {
    match semester.parse::<u8>() {
        Ok(n) if (1..=8).contains(&n) => Ok(()),
        _ => Err(AppError::InvalidFormat {
            message: format!("Semester must be 1-8, got: {}", semester),
        }),
    }
}

fn validate_academic_year(academic_year: &str) -> Result<()> {
    let pattern = Regex::new(r"^\d{4}-\d{2}$").expect("valid regex");
    if pattern.is_match(academic_year) {
        Ok(())
    } else {
        Err(AppError::InvalidFormat {
            message: format!("Academic year must be YYYY-YY, got: {}", academic_year),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semester_bounds() {
        assert!(validate_semester("1").is_ok());
        assert!(validate_semester("8").is_ok());
        assert!(validate_semester("0").is_err());
        assert!(validate_semester("9").is_err());
        assert!(validate_semester("first").is_err());
    }

    #[test]
    fn test_academic_year_format() {
        assert!(validate_academic_year("2023-24").is_ok());
        assert!(validate_academic_year("2023").is_err());
        assert!(validate_academic_year("2023-2024").is_err());
        assert!(validate_academic_year("23-24").is_err());
    }

    #[test]
    fn test_known_value_lists() {
        assert!(BRANCHES.contains(&"Other"));
        assert!(PAPER_TYPES.contains(&"end-sem"));
        assert!(PAPER_TYPES.contains(&"other"));
        assert_eq!(REQUIRED_FIELDS.len(), 6);
    }
}
