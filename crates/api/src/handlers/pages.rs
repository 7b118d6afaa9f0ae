//! Handlers for the public pages (home, project form page, contact).

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect};
use axum::Form;
use folio_core::error::CoreError;
use folio_core::technology::render_technology_icons;
use folio_core::types::DbId;
use folio_db::repositories::ProjectRepo;
use minijinja::context;

use crate::error::{AppError, AppResult};
use crate::handlers::form_body;
use crate::handlers::view::{FlashView, ProjectView};
use crate::session::{Flash, SavedSession, Session};
use crate::state::AppState;

/// GET /
///
/// List every project and drain any pending flash message.
pub async fn home(
    State(state): State<AppState>,
    mut session: Session,
) -> AppResult<(SavedSession, Html<String>)> {
    let projects = ProjectRepo::list(&state.pool).await?;
    let projects: Vec<ProjectView> = projects.iter().map(ProjectView::from).collect();

    let flash = FlashView::from(session.take_flash());
    let saved = session.save(&state.session_key)?;
    let user_name = session.display_name();

    let html = state.templates.render(
        "index.html",
        context! {
            projects => projects,
            flash => flash,
            is_login => user_name.is_some(),
            user_name => user_name,
        },
    )?;
    Ok((saved, html))
}

/// POST /
///
/// Form fields: `id`, `name`, repeated `technologies[]`.
///
/// Maps the submitted tags to icon markup for the matching project. The
/// mapping only affects this request and is not written back to storage.
pub async fn home_update(
    State(state): State<AppState>,
    mut session: Session,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> AppResult<impl IntoResponse> {
    let pairs = form_body(form)?;
    let mut id: Option<DbId> = None;
    let mut name = String::new();
    let mut technologies = Vec::new();
    for (key, value) in pairs {
        match key.as_str() {
            "id" => {
                id = Some(value.trim().parse().map_err(|_| {
                    AppError::BadRequest(format!("id must be an integer, got '{value}'"))
                })?)
            }
            "name" => name = value,
            "technologies[]" => technologies.push(value),
            _ => {}
        }
    }
    let id = id.ok_or_else(|| AppError::BadRequest("id is required".into()))?;

    let mut project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    let icons = render_technology_icons(&technologies);
    project.technologies = icons.iter().map(|s| s.to_string()).collect();
    tracing::debug!(project_id = id, icons = icons.len(), "Mapped technology icons (not persisted)");

    let display_name = if name.trim().is_empty() {
        project.name
    } else {
        name
    };
    session.set_flash(Flash::success("Project updated").with_name(display_name));
    let saved = session.save(&state.session_key)?;

    Ok((saved, Redirect::to("/")))
}

/// GET /project
///
/// Render the add-project page. Login state only toggles what is shown.
pub async fn project(State(state): State<AppState>, session: Session) -> AppResult<Html<String>> {
    let user_name = session.display_name();
    state.templates.render(
        "project.html",
        context! {
            is_login => user_name.is_some(),
            user_name => user_name,
        },
    )
}

/// GET /contact
pub async fn contact(State(state): State<AppState>, session: Session) -> AppResult<Html<String>> {
    let user_name = session.display_name();
    state.templates.render(
        "contact.html",
        context! {
            is_login => user_name.is_some(),
            user_name => user_name,
        },
    )
}
