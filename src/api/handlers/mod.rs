pub mod admin;
pub mod auth;
pub mod booking;
pub mod health;
pub mod pages;

use axum::response::Html;
use tera::Context;
use crate::error::AppError;
use crate::state::AppState;

pub(crate) fn render(state: &AppState, template: &str, context: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(state.templates.render(template, context)?))
}
