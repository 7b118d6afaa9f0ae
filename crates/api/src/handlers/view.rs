//! Template-facing view models.

use folio_core::dates::{duration_label, is_sentinel};
use folio_core::technology::render_technology_icons;
use folio_core::types::DbId;
use folio_db::models::project::Project;
use serde::Serialize;

use crate::session::Flash;

/// A project prepared for display.
///
/// Sentinel dates are shown as absent, and technology tags are mapped to
/// icon markup.
#[derive(Debug, Serialize)]
pub struct ProjectView {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub image: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration: Option<String>,
    pub technologies: Vec<String>,
    pub icons: Vec<&'static str>,
}

impl From<&Project> for ProjectView {
    fn from(p: &Project) -> Self {
        let visible = |d: Option<chrono::NaiveDate>| d.filter(|d| !is_sentinel(*d));
        let start = visible(p.start_date);
        let end = visible(p.end_date);

        Self {
            id: p.id,
            name: p.name.clone(),
            description: p.description.clone(),
            image: p.image.clone(),
            start_date: start.map(|d| d.format("%d %b %Y").to_string()),
            end_date: end.map(|d| d.format("%d %b %Y").to_string()),
            duration: duration_label(start, end),
            technologies: p.technologies.clone(),
            icons: render_technology_icons(&p.technologies),
        }
    }
}

/// Flash fields as the templates expect them.
#[derive(Debug, Default, Serialize)]
pub struct FlashView {
    pub flash_status: Option<bool>,
    pub flash_message: Option<String>,
    pub flash_name: Option<String>,
}

impl From<Option<Flash>> for FlashView {
    fn from(flash: Option<Flash>) -> Self {
        match flash {
            Some(f) => Self {
                flash_status: Some(f.status),
                flash_message: Some(f.message),
                flash_name: f.name,
            },
            None => Self::default(),
        }
    }
}
