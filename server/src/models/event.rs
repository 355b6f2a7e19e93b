use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single calendar entry owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub user_id: u64,
    pub event_id: u64,
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
}

impl Event {
    pub fn new(
        user_id: u64,
        event_id: u64,
        date: NaiveDate,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            event_id,
            date,
            title: title.into(),
            description: description.into(),
        }
    }
}
