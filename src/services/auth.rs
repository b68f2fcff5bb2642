//! Выдача и проверка JWT (HS256) и хеширование паролей.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::models::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub access: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

// bcrypt блокирует поток: считаем на blocking-пуле
pub async fn hash_password(password: &str, config: &AuthConfig) -> Result<String, AppError> {
    let password = password.to_string();
    let cost = config.bcrypt_cost;
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {e}")))?
        .map_err(AppError::from)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password check task failed: {e}")))?;
    // Битый хеш в базе означает лишь неверный пароль
    Ok(verified.unwrap_or(false))
}

pub fn issue_token(user: &User, config: &AuthConfig) -> Result<IssuedToken, AppError> {
    let now = Utc::now();
    let ttl = Duration::hours(config.jwt_expires_in_hours);
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        iat: now.timestamp() as usize,
        exp: (now + ttl).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    let access = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok(IssuedToken {
        access,
        token_type: "Bearer",
        expires_in: ttl.num_seconds(),
    })
}

pub fn verify_token(token: &str, config: &AuthConfig) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "unit-test-secret".into(),
            jwt_expires_in_hours: 1,
            bcrypt_cost: 4,
        }
    }

    fn user() -> User {
        User {
            id: 42,
            username: "alice".into(),
            password_hash: String::new(),
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let token = issue_token(&user(), &config()).unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);

        let claims = verify_token(&token.access, &config()).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(&user(), &config()).unwrap();
        let mut other = config();
        other.jwt_secret = "another-secret".into();
        assert!(matches!(verify_token(&token.access, &other), Err(AppError::Token(_))));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let mut u = user();
        u.password_hash = hash_password("s3cret-pass", &config()).await.unwrap();
        assert!(u.verify_password("s3cret-pass").await.unwrap());
        assert!(!u.verify_password("wrong").await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_a_mismatch() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash").await.unwrap());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn password_check_leaves_runtime_free() {
        let mut cfg = config();
        cfg.bcrypt_cost = 10;
        let hash = hash_password("s3cret-pass", &cfg).await.unwrap();
        let done = AtomicBool::new(false);

        // Пока bcrypt считает, единственный поток рантайма продолжает крутить таймер
        let ticker = async {
            let mut ticks = 0u32;
            while !done.load(Ordering::SeqCst) {
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                ticks += 1;
            }
            ticks
        };
        let check = async {
            let ok = verify_password("s3cret-pass", &hash).await.unwrap();
            done.store(true, Ordering::SeqCst);
            ok
        };
        let (ticks, ok) = tokio::join!(ticker, check);

        assert!(ok);
        assert!(ticks > 1, "runtime was blocked during bcrypt, ticks={ticks}");
    }
}
