#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use event_booking::{
    app,
    cache::CacheService,
    config::{AppConfig, AuthConfig, Config, DatabaseConfig, LogFormat, RedisConfig},
    database::Database,
    models::{Booking, Event, EventStatus, NewEvent, User},
    services::{
        auth::{hash_password, issue_token},
        ordering::EventOrdering,
    },
    AppState,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const PASSWORD: &str = "testpassword";
const MULTIPART_BOUNDARY: &str = "BoUnDaRyStRiNg";

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            rust_log: "event_booking=debug".to_string(),
            log_format: LogFormat::Pretty,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool_size: 1,
        },
        redis: RedisConfig {
            url: None,
            events_ttl_seconds: 60,
        },
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            jwt_expires_in_hours: 1,
            bcrypt_cost: 4,
        },
    }
}

pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn basic_auth(&self) -> String {
        let raw = format!("{}:{}", self.user.username, PASSWORD);
        format!("Basic {}", general_purpose::STANDARD.encode(raw))
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = test_config();
        let db = Database::connect(&config.database)
            .await
            .expect("Failed to open in-memory SQLite");
        db.run_migrations().await.expect("Failed to migrate test db");

        let state = Arc::new(AppState::from_parts(config, db, CacheService::disabled()));
        let router = app(state.clone());

        Self { router, state }
    }

    pub async fn create_user(&self, username: &str) -> TestUser {
        let hash = hash_password(PASSWORD, &self.state.config.auth).await.unwrap();
        let user = self.state.users.create(username, &hash).await.unwrap();
        let token = issue_token(&user, &self.state.config.auth).unwrap().access;
        TestUser { user, token }
    }

    /// Событие через хранилище, в обход API. `days` сдвигает начало от текущего момента.
    pub async fn create_event(
        &self,
        organizer: &TestUser,
        title: &str,
        status: EventStatus,
        days: i64,
        seats: i32,
    ) -> Event {
        self.state
            .events
            .create(&NewEvent {
                title: title.to_string(),
                description: format!("{} description", title),
                start_time: Utc::now() + Duration::days(days),
                location: "Test City".to_string(),
                seats,
                status,
                organizer_id: organizer.id(),
            })
            .await
            .unwrap()
    }

    /// Аналог фикстуры `event`: запланированное событие на завтра.
    pub async fn planned_event(&self, organizer: &TestUser) -> Event {
        self.create_event(organizer, "Test Event", EventStatus::Planned, 1, 100).await
    }

    /// Аналог фикстуры `past_event`: завершенное вчерашнее событие.
    pub async fn past_event(&self, organizer: &TestUser) -> Event {
        self.create_event(organizer, "Past Event", EventStatus::Completed, -1, 50).await
    }

    pub async fn book(&self, user: &TestUser, event: &Event) -> Booking {
        self.state.bookings.create(user.id(), event.id).await.unwrap()
    }

    pub async fn set_status(&self, event: &Event, status: EventStatus) -> Event {
        let mut event = event.clone();
        event.status = status;
        self.state.events.update(&event).await.unwrap()
    }

    pub async fn event_count(&self) -> usize {
        self.state.events.list(&EventOrdering::default()).await.unwrap().len()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    /// `multipart/form-data`, как шлет тестовый клиент DRF по умолчанию.
    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        auth: &str,
        fields: &[(&str, String)],
    ) -> (StatusCode, Value) {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!("--{MULTIPART_BOUNDARY}\r\n"));
            body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{MULTIPART_BOUNDARY}--\r\n"));

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, auth)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn form(&self, uri: &str, auth: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

pub fn bearer(user: &TestUser) -> String {
    format!("Bearer {}", user.token)
}
