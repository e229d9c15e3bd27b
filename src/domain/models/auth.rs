use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,

    pub username: String,
    pub role: String,

    #[serde(rename = "csrf")]
    pub csrf_token: String,
}

/// Cookies handed out by a successful sign-in.
pub struct SessionTokens {
    pub access_token: String,
    pub csrf_token: String,
}

/// The signed-in user as recovered from the access token.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub role: String,
    pub csrf_token: String,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
            csrf_token: claims.csrf_token,
        }
    }
}
