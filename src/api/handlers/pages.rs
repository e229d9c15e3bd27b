use axum::{extract::State, response::IntoResponse};
use crate::state::AppState;
use crate::api::extractors::maybe_auth::MaybeAuthUser;
use crate::api::flash::take_flash;
use crate::api::handlers::render;
use crate::error::AppError;
use std::sync::Arc;
use tera::Context;
use tower_cookies::Cookies;

pub async fn home_page(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let mut ctx = Context::new();
    ctx.insert("current_user", &user.map(|u| u.username));
    ctx.insert("flash", &take_flash(&cookies).map(|f| f.message()));
    ctx.insert("opening", &state.config.rules.opening.format("%H:%M").to_string());
    ctx.insert("closing", &state.config.rules.closing.format("%H:%M").to_string());
    render(&state, "index.html", &ctx)
}
