use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use crate::state::AppState;
use crate::domain::models::auth::SessionUser;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::{debug, Span};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const CSRF_COOKIE: &str = "csrftoken";
pub const LOGIN_PATH: &str = "/accounts/login";

/// A signed-in user. Anonymous requests are sent to the login page.
pub struct AuthUser(pub SessionUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts.extensions.get::<Cookies>()
            .cloned()
            .ok_or_else(|| StatusCode::INTERNAL_SERVER_ERROR.into_response())?;

        let login_redirect = || {
            let target = format!("{}?next={}", LOGIN_PATH, parts.uri.path());
            Redirect::to(&target).into_response()
        };

        let access_token = match cookies.get(ACCESS_TOKEN_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => return Err(login_redirect()),
        };

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let claims = app_state.auth_service.verify(&access_token).map_err(|_| {
            debug!("Rejected access token on {}", parts.uri.path());
            login_redirect()
        })?;

        let user = SessionUser::from(claims);

        Span::current().record("user_id", &user.id);

        Ok(AuthUser(user))
    }
}
