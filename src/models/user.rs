use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::AppError;
use crate::services::auth;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    // Проверить пароль по bcrypt-хешу
    pub async fn verify_password(&self, password: &str) -> Result<bool, AppError> {
        auth::verify_password(password, &self.password_hash).await
    }
}
