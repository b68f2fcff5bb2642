use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::{AuthUser, Payload};
use crate::models::{Event, EventStatus, NewEvent};
use crate::services::ordering::EventOrdering;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events/", get(list_events).post(create_event))
        .route(
            "/events/{id}/",
            get(get_event)
                .put(update_event)
                .patch(patch_event)
                .delete(delete_event),
        )
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub ordering: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(range(min = 1))]
    pub seats: i32,
    pub status: Option<EventStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EventPatchRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    #[validate(range(min = 1))]
    pub seats: Option<i32>,
    pub status: Option<EventStatus>,
}

fn event_not_found() -> AppError {
    AppError::NotFound("Событие не найдено".to_string())
}

// Менять и удалять событие может только организатор
async fn load_owned_event(state: &AppState, id: i64, user: &AuthUser) -> Result<Event, AppError> {
    let event = state.events.find_by_id(id).await?.ok_or_else(event_not_found)?;
    if event.organizer_id != user.user_id {
        return Err(AppError::Forbidden(
            "Изменять событие может только его организатор".to_string(),
        ));
    }
    Ok(event)
}

// GET /api/v1/events/?ordering=-avg_rating
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<Response, AppError> {
    let ordering = EventOrdering::parse(params.ordering.as_deref());
    let cache_key = ordering.cache_key();
    let generation = state.cache.events_generation().await;

    if let Some(generation) = generation {
        if let Some(cached) = state.cache.get_events_list(generation, &cache_key).await {
            return Ok(json_response(cached, "HIT"));
        }
    }

    let events = state.events.list(&ordering).await?;
    let json = serde_json::to_string(&events).map_err(|e| AppError::Internal(e.to_string()))?;
    if let Some(generation) = generation {
        state.cache.save_events_list(generation, &cache_key, &json).await;
    }

    Ok(json_response(json, "MISS"))
}

fn json_response(body: String, cache_status: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::HeaderName::from_static("x-cache"), cache_status),
        ],
        body,
    )
        .into_response()
}

// GET /api/v1/events/{id}/
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, AppError> {
    let event = state.events.find_by_id(id).await?.ok_or_else(event_not_found)?;
    Ok(Json(event))
}

// POST /api/v1/events/
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Payload(req): Payload<EventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new_event = NewEvent {
        title: req.title,
        description: req.description,
        start_time: req.start_time,
        location: req.location,
        seats: req.seats,
        status: req.status.unwrap_or_default(),
        organizer_id: user.user_id,
    };

    let event = state.events.create(&new_event).await?;
    state.cache.invalidate_events().await;
    info!("Event {} created by {}", event.id, user.username);

    Ok((StatusCode::CREATED, Json(event)))
}

// PUT /api/v1/events/{id}/
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Payload(req): Payload<EventRequest>,
) -> Result<Json<Event>, AppError> {
    let mut event = load_owned_event(&state, id, &user).await?;

    event.title = req.title;
    event.description = req.description;
    event.start_time = req.start_time;
    event.location = req.location;
    event.seats = req.seats;
    if let Some(status) = req.status {
        event.status = status;
    }

    let event = state.events.update(&event).await?;
    state.cache.invalidate_events().await;
    info!("Event {} updated by {}", event.id, user.username);

    Ok(Json(event))
}

// PATCH /api/v1/events/{id}/
pub async fn patch_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Payload(req): Payload<EventPatchRequest>,
) -> Result<Json<Event>, AppError> {
    let mut event = load_owned_event(&state, id, &user).await?;

    if let Some(title) = req.title {
        event.title = title;
    }
    if let Some(description) = req.description {
        event.description = description;
    }
    if let Some(start_time) = req.start_time {
        event.start_time = start_time;
    }
    if let Some(location) = req.location {
        event.location = location;
    }
    if let Some(seats) = req.seats {
        event.seats = seats;
    }
    if let Some(status) = req.status {
        event.status = status;
    }

    let event = state.events.update(&event).await?;
    state.cache.invalidate_events().await;
    info!("Event {} patched by {}", event.id, user.username);

    Ok(Json(event))
}

// DELETE /api/v1/events/{id}/
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    load_owned_event(&state, id, &user).await?;

    if !state.events.delete(id).await? {
        return Err(event_not_found());
    }
    state.cache.invalidate_events().await;
    info!("Event {} deleted by {}", id, user.username);

    Ok(StatusCode::NO_CONTENT)
}
