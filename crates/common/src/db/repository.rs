//! Repository pattern for database operations

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

/// Fields of a paper record to persist; id and uploaded_at are assigned here.
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub subject_name: String,
    pub subject_code: String,
    pub paper_type: String,
    pub branch: String,
    pub custom_branch: Option<String>,
    pub custom_paper_type: Option<String>,
    pub semester: String,
    pub academic_year: String,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub file_name: String,
    pub file_url: String,
    pub file_size: i64,
}

/// Equality filters for paper listings; `None` means "any".
#[derive(Debug, Clone, Default)]
pub struct PaperFilter {
    pub branch: Option<String>,
    pub semester: Option<String>,
    pub academic_year: Option<String>,
    pub paper_type: Option<String>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Paper Operations
    // ========================================================================

    /// Persist a new paper record with a generated id and server-assigned
    /// upload timestamp
    pub async fn save_paper(&self, paper: NewPaper) -> Result<Paper> {
        let record = PaperActiveModel {
            id: Set(Uuid::new_v4()),
            subject_name: Set(paper.subject_name),
            subject_code: Set(paper.subject_code),
            paper_type: Set(paper.paper_type),
            branch: Set(paper.branch),
            custom_branch: Set(paper.custom_branch),
            custom_paper_type: Set(paper.custom_paper_type),
            semester: Set(paper.semester),
            academic_year: Set(paper.academic_year),
            description: Set(paper.description),
            tags: Set(paper.tags),
            file_name: Set(paper.file_name),
            file_url: Set(paper.file_url),
            file_size: Set(paper.file_size),
            uploaded_at: Set(chrono::Utc::now().into()),
        };

        record.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find a paper by ID
    pub async fn find_paper_by_id(&self, id: Uuid) -> Result<Option<Paper>> {
        PaperEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List papers, newest first, with optional equality filters
    pub async fn list_papers(&self, filter: &PaperFilter) -> Result<Vec<Paper>> {
        let mut query = PaperEntity::find();

        if let Some(ref branch) = filter.branch {
            query = query.filter(PaperColumn::Branch.eq(branch));
        }
        if let Some(ref semester) = filter.semester {
            query = query.filter(PaperColumn::Semester.eq(semester));
        }
        if let Some(ref academic_year) = filter.academic_year {
            query = query.filter(PaperColumn::AcademicYear.eq(academic_year));
        }
        if let Some(ref paper_type) = filter.paper_type {
            query = query.filter(PaperColumn::PaperType.eq(paper_type));
        }

        query
            .order_by_desc(PaperColumn::UploadedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Duplicate Check
    // ========================================================================

    /// Check whether a paper with the same (subject code, academic year,
    /// paper type) tuple already exists.
    ///
    /// Read-only; a store error propagates so the caller aborts the upload
    /// rather than proceeding unverified. This check and the subsequent
    /// insert are not transactional, so concurrent uploads of the same tuple
    /// can both pass.
    pub async fn is_duplicate(
        &self,
        subject_code: &str,
        academic_year: &str,
        paper_type: &str,
    ) -> Result<bool> {
        let matches = PaperEntity::find()
            .filter(PaperColumn::SubjectCode.eq(subject_code))
            .filter(PaperColumn::AcademicYear.eq(academic_year))
            .filter(PaperColumn::PaperType.eq(paper_type))
            .count(self.read_conn())
            .await?;

        Ok(matches > 0)
    }
}
