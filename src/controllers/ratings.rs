use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::error::AppError;
use crate::middleware::{AuthUser, Payload};
use crate::models::{NewRating, Rating};
use crate::services::eligibility::{check_event, RatingRejection};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ratings/", get(get_user_ratings).post(create_rating))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRatingRequest {
    #[validate(range(min = 1, message = "event должен быть > 0"))]
    pub event: i64,
    #[validate(range(min = 1, max = 5, message = "Оценка должна быть от 1 до 5"))]
    pub score: i32,
}

// POST /api/v1/ratings/
pub async fn create_rating(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Payload(req): Payload<CreateRatingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .events
        .find_by_id(req.event)
        .await?
        .ok_or_else(|| AppError::Validation("Событие не найдено".to_string()))?;

    let attended = state.bookings.exists(user.user_id, event.id).await?;
    if let Err(rejection) = check_event(&event, attended) {
        debug!("Rating rejected: user={} event={} reason={:?}", user.user_id, event.id, rejection);
        return Err(rejection.into());
    }

    if state.ratings.exists(user.user_id, event.id).await? {
        return Err(RatingRejection::AlreadyRated.into());
    }

    let rating = state
        .ratings
        .create(&NewRating {
            user_id: user.user_id,
            event_id: event.id,
            score: req.score,
        })
        .await?;

    // средняя оценка в списке событий изменилась
    state.cache.invalidate_events().await;
    info!(
        "Rating {} created: user={} event={} score={}",
        rating.id, user.user_id, event.id, rating.score
    );

    Ok((StatusCode::CREATED, Json(rating)))
}

// GET /api/v1/ratings/
pub async fn get_user_ratings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Rating>>, AppError> {
    let ratings = state.ratings.list_for_user(user.user_id).await?;
    Ok(Json(ratings))
}
