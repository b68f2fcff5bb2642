use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::Payload;
use crate::services::auth::{hash_password, issue_token, IssuedToken};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register/", post(register))
        .route("/auth/token/", post(obtain_token))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 150))]
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

// POST /api/v1/auth/register/
pub async fn register(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Validation(
            "Пользователь с таким именем уже существует".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password, &state.config.auth).await?;
    let user = state.users.create(&req.username, &password_hash).await?;
    info!("User {} registered", user.username);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            username: user.username,
        }),
    ))
}

// POST /api/v1/auth/token/
pub async fn obtain_token(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<TokenRequest>,
) -> Result<Json<IssuedToken>, AppError> {
    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .filter(|user| user.is_active)
        .ok_or(AppError::Unauthorized)?;
    if !user.verify_password(&req.password).await? {
        return Err(AppError::Unauthorized);
    }

    Ok(Json(issue_token(&user, &state.config.auth)?))
}
