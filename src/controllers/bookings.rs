use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::{AuthUser, Payload};
use crate::models::{Booking, EventStatus};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings/", get(get_user_bookings).post(create_booking))
}

/* ---------- BOOKINGS ---------- */

// POST /api/v1/bookings/
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(range(min = 1, message = "event должен быть > 0"))]
    pub event: i64,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Payload(req): Payload<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .events
        .find_by_id(req.event)
        .await?
        .ok_or_else(|| AppError::Validation("Событие не найдено".to_string()))?;

    if event.status == EventStatus::Cancelled {
        return Err(AppError::Validation(
            "Нельзя забронировать отмененное событие".to_string(),
        ));
    }

    if state.bookings.exists(user.user_id, event.id).await? {
        return Err(AppError::Validation(
            "Вы уже забронировали это событие".to_string(),
        ));
    }

    // вместимость проверяется без блокировки
    let taken = state.bookings.count_for_event(event.id).await?;
    if taken >= i64::from(event.seats) {
        return Err(AppError::Validation("Нет свободных мест".to_string()));
    }

    let booking = state.bookings.create(user.user_id, event.id).await?;
    info!("Booking {} created: user={} event={}", booking.id, user.user_id, event.id);

    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/v1/bookings/
pub async fn get_user_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.bookings.list_for_user(user.user_id).await?;
    Ok(Json(bookings))
}
