use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// Тело запроса в JSON, `application/x-www-form-urlencoded` или
/// `multipart/form-data`, прошедшее валидацию полей.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFormat {
    Json,
    Form,
    Multipart,
}

impl BodyFormat {
    fn detect(req: &Request) -> Self {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if content_type.starts_with("application/x-www-form-urlencoded") {
            BodyFormat::Form
        } else if content_type.starts_with("multipart/form-data") {
            BodyFormat::Multipart
        } else {
            BodyFormat::Json
        }
    }
}

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value: T = match BodyFormat::detect(&req) {
            BodyFormat::Multipart => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                from_multipart(multipart).await?
            }
            format => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                if format == BodyFormat::Form {
                    serde_urlencoded::from_bytes(&bytes)
                        .map_err(|e| AppError::Validation(e.to_string()))?
                } else {
                    serde_json::from_slice(&bytes)
                        .map_err(|e| AppError::Validation(e.to_string()))?
                }
            }
        };

        value.validate()?;
        Ok(Payload(value))
    }
}

// Текстовые поля формы разбираем так же, как urlencoded тело
async fn from_multipart<T: DeserializeOwned>(mut multipart: Multipart) -> Result<T, AppError> {
    let mut fields: Vec<(String, String)> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let text = field
            .text()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        fields.push((name, text));
    }

    let encoded =
        serde_urlencoded::to_string(&fields).map_err(|e| AppError::Internal(e.to_string()))?;
    serde_urlencoded::from_str(&encoded).map_err(|e| AppError::Validation(e.to_string()))
}
