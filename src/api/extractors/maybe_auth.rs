use axum::{
    extract::{FromRequestParts, FromRef},
    http::request::Parts,
};
use crate::api::extractors::auth::ACCESS_TOKEN_COOKIE;
use crate::state::AppState;
use crate::domain::models::auth::SessionUser;
use std::convert::Infallible;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::debug;

/// Like `AuthUser`, but lets anonymous visitors through.
pub struct MaybeAuthUser(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let Some(cookies) = parts.extensions.get::<Cookies>() else {
            return Ok(MaybeAuthUser(None));
        };

        let access_token = match cookies.get(ACCESS_TOKEN_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => return Ok(MaybeAuthUser(None)),
        };

        match app_state.auth_service.verify(&access_token) {
            Ok(claims) => Ok(MaybeAuthUser(Some(SessionUser::from(claims)))),
            Err(_) => {
                // Expired or forged token -> treat as guest
                debug!("MaybeAuth: ignoring invalid access token");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}
