use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{LoginForm, NextQuery, RegisterForm};
use crate::api::extractors::auth::{ACCESS_TOKEN_COOKIE, CSRF_COOKIE};
use crate::api::flash::{set_flash, Flash};
use crate::api::forms::booking_form::FormErrors;
use crate::api::handlers::render;
use crate::domain::models::{auth::SessionTokens, user::User};
use std::sync::Arc;
use tera::Context;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::{info, warn};

const DEFAULT_LANDING: &str = "/booking/my-bookings";
const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 150;
const PASSWORD_MIN_LEN: usize = 8;

pub async fn login_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NextQuery>,
) -> Result<impl IntoResponse, AppError> {
    render_login(&state, "", safe_next(query.next.as_deref()), None)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = safe_next(form.next.as_deref());
    let username = form.username.trim();

    let Some(user) = state.user_repo.find_by_username(username).await? else {
        info!("Login failed: unknown user {}", username);
        return Ok(render_login(&state, username, next, Some(BAD_CREDENTIALS))?.into_response());
    };

    if let Err(e) = state.auth_service.verify_password(&form.password, &user.password_hash) {
        if !matches!(e, AppError::Unauthorized) {
            return Err(e);
        }
        info!("Login failed: wrong password for {}", user.id);
        return Ok(render_login(&state, username, next, Some(BAD_CREDENTIALS))?.into_response());
    }

    let tokens = state.auth_service.issue_session(&user)?;
    set_session_cookies(&cookies, &tokens, &state);

    info!("User logged in: {}", user.id);
    Ok(Redirect::to(next).into_response())
}

pub async fn register_page(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    render_register(&state, "", &FormErrors::default())
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim().to_string();
    let mut errors = validate_registration(&username, &form);

    if errors.is_empty() && state.user_repo.find_by_username(&username).await?.is_some() {
        errors.add("username", DUPLICATE_USERNAME);
    }
    if !errors.is_empty() {
        return Ok(render_register(&state, &username, &errors)?.into_response());
    }

    let password_hash = state.auth_service.hash_password(&form.password)?;
    let user = match state.user_repo.create(&User::new(username.clone(), password_hash)).await {
        Ok(user) => user,
        Err(AppError::Conflict(msg)) => {
            warn!("register: {}", msg);
            errors.add("username", DUPLICATE_USERNAME);
            return Ok(render_register(&state, &username, &errors)?.into_response());
        }
        Err(e) => return Err(e),
    };

    let tokens = state.auth_service.issue_session(&user)?;
    set_session_cookies(&cookies, &tokens, &state);

    info!("User registered: {}", user.id);
    Ok(Redirect::to(DEFAULT_LANDING).into_response())
}

pub async fn logout(cookies: Cookies) -> impl IntoResponse {
    cookies.remove(Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/").into());
    cookies.remove(Cookie::build((CSRF_COOKIE, "")).path("/").into());
    set_flash(&cookies, Flash::LoggedOut);

    info!("User logged out");

    Redirect::to("/")
}

const BAD_CREDENTIALS: &str = "Please enter a correct username and password.";
const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

fn render_login(state: &AppState, username: &str, next: &str, error: Option<&str>) -> Result<axum::response::Html<String>, AppError> {
    let mut ctx = Context::new();
    ctx.insert("username", username);
    ctx.insert("next", next);
    ctx.insert("error", &error);
    render(state, "login.html", &ctx)
}

fn render_register(state: &AppState, username: &str, errors: &FormErrors) -> Result<axum::response::Html<String>, AppError> {
    let mut ctx = Context::new();
    ctx.insert("username", username);
    ctx.insert("errors", errors);
    render(state, "register.html", &ctx)
}

fn validate_registration(username: &str, form: &RegisterForm) -> FormErrors {
    let mut errors = FormErrors::default();

    let len = username.chars().count();
    if len < USERNAME_MIN_LEN || len > USERNAME_MAX_LEN {
        errors.add("username", format!("Username must be between {} and {} characters.", USERNAME_MIN_LEN, USERNAME_MAX_LEN));
    } else if !username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
        errors.add("username", "Username may contain only letters, digits and @ . + - _ characters.");
    }

    if form.password.chars().count() < PASSWORD_MIN_LEN {
        errors.add("password", format!("Password must contain at least {} characters.", PASSWORD_MIN_LEN));
    }
    if form.password != form.password_confirm {
        errors.add("password_confirm", "The two password fields did not match.");
    }

    errors
}

/// Only same-site absolute paths are followed after sign-in.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
        _ => {
            if let Some(rejected) = next.filter(|n| !n.is_empty()) {
                warn!("Ignoring unsafe redirect target: {}", rejected);
            }
            DEFAULT_LANDING
        }
    }
}

fn set_session_cookies(cookies: &Cookies, tokens: &SessionTokens, state: &AppState) {
    let max_age = Duration::minutes(state.config.session_ttl_minutes);
    let secure = state.config.cookie_secure;

    let mut access_c = Cookie::new(ACCESS_TOKEN_COOKIE, tokens.access_token.clone());
    access_c.set_http_only(true);
    access_c.set_secure(secure);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(max_age);
    cookies.add(access_c);

    // Readable by page scripts; the server compares it against the token's claim.
    let mut csrf_c = Cookie::new(CSRF_COOKIE, tokens.csrf_token.clone());
    csrf_c.set_secure(secure);
    csrf_c.set_same_site(SameSite::Strict);
    csrf_c.set_path("/");
    csrf_c.set_max_age(max_age);
    cookies.add(csrf_c);
}
