//! Paper record entity
//!
//! One row per uploaded exam paper. The (subject_code, academic_year,
//! paper_type) tuple is expected to be unique per logical paper, but that is
//! enforced by the duplicate check in the repository, not by a storage-level
//! constraint.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "papers")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub subject_name: String,

    #[sea_orm(column_type = "Text")]
    pub subject_code: String,

    /// One of the known paper types, or the free-text override
    #[sea_orm(column_type = "Text")]
    pub paper_type: String,

    /// One of the known branches, or the free-text override
    #[sea_orm(column_type = "Text")]
    pub branch: String,

    /// Recorded when the branch was entered as a free-text override
    #[sea_orm(column_type = "Text", nullable)]
    pub custom_branch: Option<String>,

    /// Recorded when the paper type was entered as a free-text override
    #[sea_orm(column_type = "Text", nullable)]
    pub custom_paper_type: Option<String>,

    /// "1" through "8"
    #[sea_orm(column_type = "Text")]
    pub semester: String,

    /// "YYYY-YY"
    #[sea_orm(column_type = "Text")]
    pub academic_year: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Comma-separated keywords
    #[sea_orm(column_type = "Text", nullable)]
    pub tags: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub file_name: String,

    #[sea_orm(column_type = "Text")]
    pub file_url: String,

    /// File size in bytes
    pub file_size: i64,

    /// Server-assigned upload timestamp
    pub uploaded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
