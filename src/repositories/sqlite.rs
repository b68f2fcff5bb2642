use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::{BookingRepository, EventRepository, RatingRepository, UserRepository};
use crate::error::AppError;
use crate::models::{Booking, Event, NewEvent, NewRating, Rating, User};
use crate::services::ordering::EventOrdering;

// AVG в SQLite уже REAL
const EVENT_SELECT: &str = r#"
    SELECT e.id, e.title, e.description, e.start_time, e.location, e.seats,
           e.status, e.organizer_id, AVG(r.score) AS avg_rating
    FROM events e
    LEFT JOIN ratings r ON r.event_id = e.id
"#;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for SqliteStore {
    async fn create(&self, event: &NewEvent) -> Result<Event, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO events
                 (title, description, start_time, location, seats, status, organizer_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id"
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_time)
        .bind(&event.location)
        .bind(event.seats)
        .bind(event.status.as_str())
        .bind(event.organizer_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        EventRepository::find_by_id(self, id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("event {} vanished after insert", id)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError> {
        let sql = format!("{} WHERE e.id = ? GROUP BY e.id", EVENT_SELECT);
        Ok(sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, ordering: &EventOrdering) -> Result<Vec<Event>, AppError> {
        let sql = format!("{} GROUP BY e.id ORDER BY {}", EVENT_SELECT, ordering.order_by_clause());
        Ok(sqlx::query_as::<_, Event>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        let result = sqlx::query(
            "UPDATE events
             SET title = ?, description = ?, start_time = ?, location = ?, seats = ?, status = ?
             WHERE id = ?"
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_time)
        .bind(&event.location)
        .bind(event.seats)
        .bind(event.status.as_str())
        .bind(event.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Событие не найдено".into()));
        }
        EventRepository::find_by_id(self, event.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Событие не найдено".into()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BookingRepository for SqliteStore {
    async fn create(&self, user_id: i64, event_id: i64) -> Result<Booking, AppError> {
        Ok(sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (user_id, event_id, created_at)
             VALUES (?, ?, ?)
             RETURNING id, user_id, event_id, created_at"
        )
        .bind(user_id)
        .bind(event_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn exists(&self, user_id: i64, event_id: i64) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings WHERE user_id = ? AND event_id = ?"
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn count_for_event(&self, event_id: i64) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE event_id = ?")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Booking>, AppError> {
        Ok(sqlx::query_as::<_, Booking>(
            "SELECT id, user_id, event_id, created_at
             FROM bookings
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl RatingRepository for SqliteStore {
    async fn create(&self, rating: &NewRating) -> Result<Rating, AppError> {
        Ok(sqlx::query_as::<_, Rating>(
            "INSERT INTO ratings (user_id, event_id, score, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING id, user_id, event_id, score, created_at"
        )
        .bind(rating.user_id)
        .bind(rating.event_id)
        .bind(rating.score)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn exists(&self, user_id: i64, event_id: i64) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ratings WHERE user_id = ? AND event_id = ?"
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Rating>, AppError> {
        Ok(sqlx::query_as::<_, Rating>(
            "SELECT id, user_id, event_id, score, created_at
             FROM ratings
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        Ok(sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, is_active, date_joined)
             VALUES (?, ?, 1, ?)
             RETURNING id, username, password_hash, is_active, date_joined"
        )
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, is_active, date_joined FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, is_active, date_joined
             FROM users WHERE username = ?"
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }
}
