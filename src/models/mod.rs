pub mod user;
pub mod event;
pub mod booking;
pub mod rating;

pub use user::User;
pub use event::{Event, EventStatus, NewEvent};
pub use booking::Booking;
pub use rating::{NewRating, Rating};
