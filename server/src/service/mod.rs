//! Input validation in front of the event store.
//!
//! Every operation takes the raw strings a client sent, turns them into typed
//! values and only then touches the store.

use std::num::ParseIntError;
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::Event;
use crate::storage::{EventStore, StoreError};

/// Accepted layout for every date a client sends.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid user_id: {0}")]
    InvalidUserId(#[source] ParseIntError),

    #[error("invalid event_id: {0}")]
    InvalidEventId(#[source] ParseIntError),

    #[error("invalid date, expected YYYY-MM-DD: {0}")]
    InvalidDate(#[source] chrono::ParseError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("title is required")]
    TitleRequired,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// True for malformed input, as opposed to a rule the request broke.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidUserId(_)
                | ServiceError::InvalidEventId(_)
                | ServiceError::InvalidDate(_)
                | ServiceError::InvalidRequest(_)
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone, Default)]
pub struct EventService {
    store: Arc<EventStore>,
}

impl EventService {
    pub fn new(store: Arc<EventStore>) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &EventStore {
        &self.store
    }

    /// Create an event under a freshly generated id.
    pub fn create_event(
        &self,
        user_id: &str,
        date: &str,
        title: &str,
        description: &str,
    ) -> ServiceResult<Event> {
        let user_id = parse_user_id(user_id)?;
        let date = parse_date(date)?;
        require_title(title)?;

        let event = Event::new(user_id, self.store.next_event_id(), date, title, description);
        self.store.create(event.clone())?;

        tracing::debug!(user_id, event_id = event.event_id, "Event created");
        Ok(event)
    }

    pub fn update_event(
        &self,
        user_id: &str,
        event_id: &str,
        date: &str,
        title: &str,
        description: &str,
    ) -> ServiceResult<Event> {
        let user_id = parse_user_id(user_id)?;
        let event_id = parse_event_id(event_id)?;
        let date = parse_date(date)?;
        require_title(title)?;

        let event = Event::new(user_id, event_id, date, title, description);
        self.store.update(event.clone())?;

        tracing::debug!(user_id, event_id, "Event updated");
        Ok(event)
    }

    pub fn delete_event(&self, user_id: &str, event_id: &str) -> ServiceResult<()> {
        let user_id = parse_user_id(user_id)?;
        let event_id = parse_event_id(event_id)?;

        self.store.delete(user_id, event_id)?;

        tracing::debug!(user_id, event_id, "Event deleted");
        Ok(())
    }

    pub fn events_for_day(&self, user_id: &str, date: &str) -> ServiceResult<Vec<Event>> {
        let (user_id, date) = parse_user_id_and_date(user_id, date)?;
        Ok(self.store.events_for_day(user_id, date)?)
    }

    pub fn events_for_week(&self, user_id: &str, date: &str) -> ServiceResult<Vec<Event>> {
        let (user_id, date) = parse_user_id_and_date(user_id, date)?;
        Ok(self.store.events_for_week(user_id, date)?)
    }

    pub fn events_for_month(&self, user_id: &str, date: &str) -> ServiceResult<Vec<Event>> {
        let (user_id, date) = parse_user_id_and_date(user_id, date)?;
        Ok(self.store.events_for_month(user_id, date)?)
    }
}

fn parse_user_id(raw: &str) -> ServiceResult<u64> {
    raw.parse().map_err(ServiceError::InvalidUserId)
}

fn parse_event_id(raw: &str) -> ServiceResult<u64> {
    raw.parse().map_err(ServiceError::InvalidEventId)
}

pub fn parse_date(raw: &str) -> ServiceResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(ServiceError::InvalidDate)
}

fn parse_user_id_and_date(user_id: &str, date: &str) -> ServiceResult<(u64, NaiveDate)> {
    Ok((parse_user_id(user_id)?, parse_date(date)?))
}

fn require_title(title: &str) -> ServiceResult<()> {
    if title.is_empty() {
        return Err(ServiceError::TitleRequired);
    }
    Ok(())
}
