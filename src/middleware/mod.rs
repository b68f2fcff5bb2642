use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::User;
use crate::services::auth::verify_token;

mod payload;

pub use payload::Payload;

/// Пользователь, от имени которого выполняется запрос.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
        }
    }
}

// Bearer JWT или Basic auth
impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let user = if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let claims = verify_token(token.trim(), &state.config.auth)?;
            state.users.find_by_id(claims.sub).await?
        } else if let Some(encoded) = auth_header.strip_prefix("Basic ") {
            let (username, password) = decode_basic(encoded.trim())?;
            match state.users.find_by_username(&username).await? {
                Some(user) => user.verify_password(&password).await?.then_some(user),
                None => None,
            }
        } else {
            None
        };

        let user = user
            .filter(|user| user.is_active)
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser::from(user))
    }
}

// Разделяем username:password
fn decode_basic(encoded: &str) -> Result<(String, String), AppError> {
    let decoded = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| AppError::Unauthorized)?;
    let credentials = String::from_utf8(decoded).map_err(|_| AppError::Unauthorized)?;
    let (username, password) = credentials
        .split_once(':')
        .ok_or(AppError::Unauthorized)?;
    Ok((username.to_string(), password.to_string()))
}
