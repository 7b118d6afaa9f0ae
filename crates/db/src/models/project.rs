//! Project entity model and DTOs.

use chrono::NaiveDate;
use folio_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A project row from the `tb_project` table.
///
/// Rows returned by [`ProjectRepo::list`](crate::repositories::ProjectRepo::list)
/// never carry `None` dates; missing dates are reported as the sentinel
/// `1970-01-01`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: String,
    pub technologies: Vec<String>,
    /// Relative path of the uploaded image, e.g. `upload/3f2a.png`.
    pub image: String,
}

/// DTO for inserting a new project.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: String,
    pub technologies: Vec<String>,
    pub image: String,
}
