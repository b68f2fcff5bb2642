//! Хранилища сущностей. Каждое хранилище реализовано дважды:
//! для PostgreSQL и для SQLite, бэкенд выбирается в `database`.

pub mod postgres;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Booking, Event, NewEvent, NewRating, Rating, User};
use crate::services::ordering::EventOrdering;

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &NewEvent) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError>;
    async fn list(&self, ordering: &EventOrdering) -> Result<Vec<Event>, AppError>;
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    /// `false`, если события с таким id нет.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, user_id: i64, event_id: i64) -> Result<Booking, AppError>;
    async fn exists(&self, user_id: i64, event_id: i64) -> Result<bool, AppError>;
    async fn count_for_event(&self, event_id: i64) -> Result<i64, AppError>;
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Booking>, AppError>;
}

#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn create(&self, rating: &NewRating) -> Result<Rating, AppError>;
    async fn exists(&self, user_id: i64, event_id: i64) -> Result<bool, AppError>;
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Rating>, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}
