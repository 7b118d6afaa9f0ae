//! Handlers for project detail, creation and deletion.

use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use folio_core::dates::{parse_form_date, validate_date_range};
use folio_core::error::CoreError;
use folio_core::types::DbId;
use folio_db::models::project::CreateProject;
use folio_db::repositories::ProjectRepo;
use minijinja::context;

use crate::error::{AppError, AppResult};
use crate::handlers::view::ProjectView;
use crate::session::{Flash, SavedSession, Session};
use crate::state::AppState;
use crate::upload::{fields, ProjectUpload};

/// GET /project-detail/{id}
pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<DbId>,
) -> AppResult<Html<String>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    let user_name = session.display_name();
    state.templates.render(
        "project-detail.html",
        context! {
            project => ProjectView::from(&project),
            is_login => user_name.is_some(),
            user_name => user_name,
        },
    )
}

/// POST /add-project
///
/// Multipart form with an `input-image` file. Dates are required
/// `YYYY-MM-DD` values; malformed dates return 400 and the stored image is
/// removed.
pub async fn create(
    State(state): State<AppState>,
    mut session: Session,
    upload: ProjectUpload,
) -> AppResult<(SavedSession, Redirect)> {
    let dates = parse_form_date(fields::START_DATE, &upload.start_date).and_then(|start| {
        let end = parse_form_date(fields::END_DATE, &upload.end_date)?;
        validate_date_range(start, end)?;
        Ok((start, end))
    });
    let (start_date, end_date) = match dates {
        Ok(dates) => dates,
        Err(e) => {
            upload.image.discard().await;
            return Err(e.into());
        }
    };

    let input = CreateProject {
        name: upload.name,
        start_date: Some(start_date),
        end_date: Some(end_date),
        description: upload.description,
        technologies: upload.technologies,
        image: upload.image.relative_path.clone(),
    };

    let project = match ProjectRepo::create(&state.pool, &input).await {
        Ok(project) => project,
        Err(e) => {
            upload.image.discard().await;
            return Err(e.into());
        }
    };
    tracing::info!(project_id = project.id, name = %project.name, "Project created");

    session.set_flash(Flash::success("Project added").with_name(project.name));
    let saved = session.save(&state.session_key)?;
    Ok((saved, Redirect::to("/")))
}

/// GET /delete-project/{id}
///
/// Returns 404 when no project has the given id.
pub async fn delete(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<DbId>,
) -> AppResult<(SavedSession, Redirect)> {
    let deleted = ProjectRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }
    tracing::info!(project_id = id, "Project deleted");

    session.set_flash(Flash::success("Project deleted"));
    let saved = session.save(&state.session_key)?;
    Ok((saved, Redirect::to("/")))
}
