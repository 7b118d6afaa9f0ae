//! Handlers for registration, login and logout.
//!
//! Credential failures never surface as HTTP errors: they set a flash
//! message and redirect back to the relevant form.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::Form;
use chrono::Utc;
use folio_core::error::CoreError;
use minijinja::context;
use serde::Deserialize;

use crate::auth::account::{self, Registration};
use crate::error::{AppError, AppResult};
use crate::handlers::form_body;
use crate::handlers::view::FlashView;
use crate::session::{Flash, SavedSession, Session};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Form body for `POST /register`.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Form body for `POST /login`.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /form-register
pub async fn form_register(
    State(state): State<AppState>,
    mut session: Session,
) -> AppResult<(SavedSession, Html<String>)> {
    let flash = FlashView::from(session.take_flash());
    let saved = session.save(&state.session_key)?;
    let user_name = session.display_name();
    let html = state.templates.render(
        "register.html",
        context! {
            flash => flash,
            is_login => user_name.is_some(),
            user_name => user_name,
        },
    )?;
    Ok((saved, html))
}

/// GET /form-login
pub async fn form_login(
    State(state): State<AppState>,
    mut session: Session,
) -> AppResult<(SavedSession, Html<String>)> {
    let flash = FlashView::from(session.take_flash());
    let saved = session.save(&state.session_key)?;
    let user_name = session.display_name();
    let html = state.templates.render(
        "login.html",
        context! {
            flash => flash,
            is_login => user_name.is_some(),
            user_name => user_name,
        },
    )?;
    Ok((saved, html))
}

/// POST /register
///
/// On success redirects to the login form; on failure back to the register
/// form. Both carry a flash message.
pub async fn register(
    State(state): State<AppState>,
    mut session: Session,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> AppResult<(SavedSession, Redirect)> {
    let input = form_body(form)?;
    let registration = Registration {
        name: input.name,
        email: input.email,
        password: input.password,
    };

    let target = match account::register(&state.pool, &registration).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, "User registered");
            session.set_flash(Flash::success("Register success"));
            "/form-login"
        }
        Err(AppError::Core(CoreError::Validation(msg) | CoreError::Conflict(msg))) => {
            session.set_flash(Flash::failure(format!("Register failed: {msg}")));
            "/form-register"
        }
        Err(e) => {
            tracing::error!(error = %e, "Registration failed");
            session.set_flash(Flash::failure("Register failed"));
            "/form-register"
        }
    };

    let saved = session.save(&state.session_key)?;
    Ok((saved, Redirect::to(target)))
}

/// POST /login
///
/// Establishes a 3-hour session on success.
pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    form: Result<Form<LoginForm>, FormRejection>,
) -> AppResult<(SavedSession, Redirect)> {
    let input = form_body(form)?;

    let target = match account::authenticate(&state.pool, &input.email, &input.password).await {
        Ok(grant) => {
            tracing::info!(user_id = grant.user_id, "User logged in");
            session.login(&grant, Utc::now());
            session.set_flash(Flash::success("Login success").with_name(grant.name));
            "/"
        }
        Err(AppError::Core(CoreError::Unauthorized(msg))) => {
            tracing::warn!(email = %input.email, "Failed login attempt");
            session.set_flash(Flash::failure(msg));
            "/form-login"
        }
        Err(e) => return Err(e),
    };

    let saved = session.save(&state.session_key)?;
    Ok((saved, Redirect::to(target)))
}

/// GET /logout
pub async fn logout(
    State(state): State<AppState>,
    mut session: Session,
) -> AppResult<(SavedSession, Redirect)> {
    if let Ok(user_id) = session.user_id() {
        tracing::info!(user_id, "User logged out");
    }
    session.invalidate();
    let saved = session.save(&state.session_key)?;
    Ok((saved, Redirect::to("/")))
}
