pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, pages, project};
use crate::state::AppState;

/// Build the site route table.
///
/// ```text
/// GET  /                       home (list projects, drain flash)
/// POST /                       home_update (in-memory icon mapping)
/// GET  /project                project page
/// GET  /contact                contact page
/// GET  /project-detail/{id}    project detail
/// GET  /delete-project/{id}    delete project
/// POST /add-project            create project (multipart)
/// GET  /form-register          register form
/// GET  /form-login             login form
/// POST /register               register
/// POST /login                  login
/// GET  /logout                 logout
/// ```
pub fn site_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home).post(pages::home_update))
        .route("/project", get(pages::project))
        .route("/contact", get(pages::contact))
        .route("/project-detail/{id}", get(project::detail))
        .route("/delete-project/{id}", get(project::delete))
        .route("/add-project", post(project::create))
        .route("/form-register", get(auth::form_register))
        .route("/form-login", get(auth::form_login))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
}
