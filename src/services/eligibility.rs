//! Правило допуска оценки: оценивать можно только завершенное событие,
//! которое пользователь посетил. Посещение подтверждается наличием брони.

use thiserror::Error;

use crate::models::{Event, EventStatus};

/// Причина отказа в оценке. Тексты сообщений отдаются клиенту как есть.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RatingRejection {
    #[error("Можно оценивать только завершенные события")]
    EventNotCompleted,
    #[error("Можно оценивать только свои посещенные события")]
    NotAParticipant,
    #[error("Вы уже оценили это событие")]
    AlreadyRated,
}

/// Проверяет статус события раньше, чем участие пользователя.
pub fn check_eligibility(status: EventStatus, attended: bool) -> Result<(), RatingRejection> {
    if status != EventStatus::Completed {
        return Err(RatingRejection::EventNotCompleted);
    }
    if !attended {
        return Err(RatingRejection::NotAParticipant);
    }
    Ok(())
}

pub fn check_event(event: &Event, attended: bool) -> Result<(), RatingRejection> {
    check_eligibility(event.status, attended)
}
