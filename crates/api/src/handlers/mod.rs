pub mod auth;
pub mod pages;
pub mod project;
pub mod view;

use axum::extract::rejection::FormRejection;
use axum::Form;

use crate::error::{AppError, AppResult};

/// Unwrap an optional `Form` extraction, turning any rejection (wrong
/// content type, undecodable body, missing field) into a 400.
pub(crate) fn form_body<T>(form: Result<Form<T>, FormRejection>) -> AppResult<T> {
    form.map(|Form(body)| body)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}
