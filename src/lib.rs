pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod repositories;
pub mod services;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::repositories::{BookingRepository, EventRepository, RatingRepository, UserRepository};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub db: database::Database,
    pub cache: cache::CacheService,
    pub events: Arc<dyn EventRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub ratings: Arc<dyn RatingRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Подключается к БД, применяет миграции и, если задан `REDIS_URL`, к Redis.
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::connect(&config.database).await?;
        db.run_migrations().await?;

        let redis = redis_client::RedisClient::connect_optional(config.redis.url.as_deref()).await?;
        let cache = cache::CacheService::new(redis, config.redis.events_ttl_seconds);

        Ok(Arc::new(Self::from_parts(config, db, cache)))
    }

    pub fn from_parts(
        config: config::Config,
        db: database::Database,
        cache: cache::CacheService,
    ) -> Self {
        let repos = db.repositories();
        Self {
            config,
            db,
            cache,
            events: repos.events,
            bookings: repos.bookings,
            ratings: repos.ratings,
            users: repos.users,
        }
    }
}

/// Главный роутер: API v1 под `/api/v1`, плюс служебные маршруты.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Event Booking API v1" }))
        .route("/health", get(health))
        .nest("/api/v1", controllers::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!("Health check failed: {:?}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
        }
    }
}
