//! In-memory event storage.
//!
//! Events live in a two-level map, user id first and event id second, behind
//! one reader-writer lock. Mutations hold the write lock for the whole call;
//! lookups hold the shared lock and hand back clones.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use thiserror::Error;
use tracing::warn;

use crate::models::Event;

mod window;

pub use window::DateWindow;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("user not found")]
    UserNotFound,

    #[error("event not found")]
    EventNotFound,

    #[error("existing event")]
    ExistingEvent,
}

pub type StoreResult<T> = Result<T, StoreError>;

type UserBucket = HashMap<u64, Event>;

#[derive(Debug, Default)]
pub struct EventStore {
    users: RwLock<HashMap<u64, UserBucket>>,
    last_event_id: AtomicU64,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the shared lock, recovering the map if a writer panicked.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<u64, UserBucket>> {
        match self.users.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Event store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<u64, UserBucket>> {
        match self.users.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Event store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Hand out a fresh event id derived from the wall clock in nanoseconds.
    ///
    /// Ids are strictly increasing for the lifetime of the store, even when
    /// two calls land in the same clock tick or the clock steps backwards.
    pub fn next_event_id(&self) -> u64 {
        let now = Utc::now()
            .timestamp_nanos_opt()
            .map_or(0, |nanos| nanos.max(0) as u64);

        let bump = |last: u64| now.max(last.saturating_add(1));
        let previous = match self
            .last_event_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(bump(last)))
        {
            Ok(previous) | Err(previous) => previous,
        };
        bump(previous)
    }

    pub fn create(&self, event: Event) -> StoreResult<()> {
        let mut users = self.write();
        let bucket = users.entry(event.user_id).or_default();

        if bucket.contains_key(&event.event_id) {
            return Err(StoreError::ExistingEvent);
        }
        bucket.insert(event.event_id, event);
        Ok(())
    }

    /// Replace a stored event wholesale.
    pub fn update(&self, event: Event) -> StoreResult<()> {
        let mut users = self.write();
        let stored = users
            .get_mut(&event.user_id)
            .ok_or(StoreError::UserNotFound)?
            .get_mut(&event.event_id)
            .ok_or(StoreError::EventNotFound)?;

        *stored = event;
        Ok(())
    }

    /// Remove one event. The user's bucket is kept even when it becomes empty.
    pub fn delete(&self, user_id: u64, event_id: u64) -> StoreResult<()> {
        let mut users = self.write();
        users
            .get_mut(&user_id)
            .ok_or(StoreError::UserNotFound)?
            .remove(&event_id)
            .map(|_| ())
            .ok_or(StoreError::EventNotFound)
    }

    pub fn get(&self, user_id: u64, event_id: u64) -> StoreResult<Event> {
        let users = self.read();
        users
            .get(&user_id)
            .ok_or(StoreError::UserNotFound)?
            .get(&event_id)
            .cloned()
            .ok_or(StoreError::EventNotFound)
    }

    pub fn events_for_day(&self, user_id: u64, date: NaiveDate) -> StoreResult<Vec<Event>> {
        self.events_in(user_id, DateWindow::day(date))
    }

    /// Events in the seven days starting at `start`, whatever weekday it is.
    pub fn events_for_week(&self, user_id: u64, start: NaiveDate) -> StoreResult<Vec<Event>> {
        let end = start.checked_add_days(Days::new(7));
        self.events_in(user_id, DateWindow::new(start, end))
    }

    /// Events in the calendar month containing `date`.
    pub fn events_for_month(&self, user_id: u64, date: NaiveDate) -> StoreResult<Vec<Event>> {
        let first = date.with_day(1).unwrap_or(date);
        let end = first.checked_add_months(Months::new(1));
        self.events_in(user_id, DateWindow::new(first, end))
    }

    /// Copy out every event of `user_id` whose date falls inside `window`.
    pub fn events_in(&self, user_id: u64, window: DateWindow) -> StoreResult<Vec<Event>> {
        let users = self.read();
        let bucket = users.get(&user_id).ok_or(StoreError::UserNotFound)?;

        Ok(bucket
            .values()
            .filter(|event| window.contains(event.date))
            .cloned()
            .collect())
    }

    /// Drop every user and event.
    pub fn clear(&self) {
        self.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(user_id: u64, event_id: u64, on: NaiveDate) -> Event {
        Event::new(user_id, event_id, on, format!("Event {}", event_id), "")
    }

    #[test]
    fn test_create_then_get_returns_equal_event() {
        let store = EventStore::new();
        let created = Event::new(1, 1, date(2024, 1, 15), "Test Event", "notes");

        store.create(created.clone()).unwrap();

        assert_eq!(store.get(1, 1).unwrap(), created);
    }

    #[test]
    fn test_create_existing_event_keeps_original() {
        let store = EventStore::new();
        store
            .create(Event::new(1, 1, date(2024, 1, 15), "Existing", ""))
            .unwrap();

        let err = store
            .create(Event::new(1, 1, date(2024, 3, 1), "Duplicate", ""))
            .unwrap_err();

        assert_eq!(err, StoreError::ExistingEvent);
        assert_eq!(store.get(1, 1).unwrap().title, "Existing");
    }

    #[test]
    fn test_same_event_id_under_different_users() {
        let store = EventStore::new();
        store.create(event(1, 7, date(2024, 1, 15))).unwrap();
        store.create(event(2, 7, date(2024, 1, 15))).unwrap();

        assert_eq!(store.get(1, 7).unwrap().user_id, 1);
        assert_eq!(store.get(2, 7).unwrap().user_id, 2);
    }

    #[test]
    fn test_update_replaces_whole_record() {
        let store = EventStore::new();
        store
            .create(Event::new(1, 1, date(2024, 1, 15), "Old Title", "old notes"))
            .unwrap();

        let replacement = Event::new(1, 1, date(2024, 1, 10), "New Title", "");
        store.update(replacement.clone()).unwrap();

        assert_eq!(store.get(1, 1).unwrap(), replacement);
    }

    #[test]
    fn test_update_missing_user_and_event() {
        let store = EventStore::new();
        assert_eq!(
            store.update(event(1, 1, date(2024, 1, 15))),
            Err(StoreError::UserNotFound)
        );

        store.create(event(1, 1, date(2024, 1, 15))).unwrap();
        assert_eq!(
            store.update(event(1, 2, date(2024, 1, 15))),
            Err(StoreError::EventNotFound)
        );
    }

    #[test]
    fn test_delete_twice() {
        let store = EventStore::new();
        store.create(event(1, 1, date(2024, 1, 15))).unwrap();

        assert_eq!(store.delete(1, 1), Ok(()));
        assert_eq!(store.delete(1, 1), Err(StoreError::EventNotFound));
        assert_eq!(store.delete(2, 1), Err(StoreError::UserNotFound));
    }

    #[test]
    fn test_delete_keeps_user_bucket() {
        let store = EventStore::new();
        store.create(event(1, 1, date(2024, 1, 15))).unwrap();
        store.delete(1, 1).unwrap();

        assert_eq!(store.events_for_day(1, date(2024, 1, 15)), Ok(vec![]));
    }

    #[test]
    fn test_events_for_day() {
        let store = EventStore::new();
        store.create(event(1, 1, date(2024, 1, 15))).unwrap();
        store.create(event(1, 2, date(2024, 1, 15))).unwrap();
        store.create(event(1, 3, date(2024, 1, 16))).unwrap();

        assert_eq!(store.events_for_day(1, date(2024, 1, 15)).unwrap().len(), 2);
        assert_eq!(store.events_for_day(1, date(2024, 1, 16)).unwrap().len(), 1);
        assert!(store.events_for_day(1, date(2024, 1, 1)).unwrap().is_empty());
    }

    #[test]
    fn test_listing_unknown_user() {
        let store = EventStore::new();
        let day = date(2024, 1, 15);

        assert_eq!(store.events_for_day(9, day), Err(StoreError::UserNotFound));
        assert_eq!(store.events_for_week(9, day), Err(StoreError::UserNotFound));
        assert_eq!(store.events_for_month(9, day), Err(StoreError::UserNotFound));
    }

    #[test]
    fn test_events_for_week_is_half_open() {
        let store = EventStore::new();
        store.create(event(1, 1, date(2024, 1, 15))).unwrap();
        store.create(event(1, 2, date(2024, 1, 17))).unwrap();
        store.create(event(1, 3, date(2024, 1, 21))).unwrap();
        store.create(event(1, 4, date(2024, 1, 22))).unwrap();
        store.create(event(1, 5, date(2024, 1, 14))).unwrap();

        let mut ids: Vec<u64> = store
            .events_for_week(1, date(2024, 1, 15))
            .unwrap()
            .into_iter()
            .map(|e| e.event_id)
            .collect();
        ids.sort_unstable();

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_events_for_week_starts_on_given_date() {
        let store = EventStore::new();
        store.create(event(1, 1, date(2024, 1, 15))).unwrap();
        store.create(event(1, 2, date(2024, 1, 17))).unwrap();
        store.create(event(1, 3, date(2024, 1, 23))).unwrap();

        assert_eq!(store.events_for_week(1, date(2024, 1, 15)).unwrap().len(), 2);
        assert_eq!(store.events_for_week(1, date(2024, 1, 22)).unwrap().len(), 1);
    }

    #[test]
    fn test_events_for_month() {
        let store = EventStore::new();
        store.create(event(1, 1, date(2024, 1, 15))).unwrap();
        store.create(event(1, 2, date(2024, 1, 20))).unwrap();
        store.create(event(1, 3, date(2024, 2, 15))).unwrap();

        assert_eq!(store.events_for_month(1, date(2024, 2, 1)).unwrap().len(), 1);
        assert_eq!(store.events_for_month(1, date(2024, 1, 31)).unwrap().len(), 2);
    }

    #[test]
    fn test_events_for_month_bounds() {
        let store = EventStore::new();
        store.create(event(1, 1, date(2024, 1, 1))).unwrap();
        store.create(event(1, 2, date(2024, 1, 31))).unwrap();
        store.create(event(1, 3, date(2024, 2, 1))).unwrap();
        store.create(event(1, 4, date(2023, 12, 31))).unwrap();

        assert_eq!(store.events_for_month(1, date(2024, 1, 15)).unwrap().len(), 2);
    }

    #[test]
    fn test_events_for_month_across_year_end() {
        let store = EventStore::new();
        store.create(event(1, 1, date(2024, 12, 31))).unwrap();
        store.create(event(1, 2, date(2025, 1, 1))).unwrap();

        let december = store.events_for_month(1, date(2024, 12, 5)).unwrap();
        assert_eq!(december.len(), 1);
        assert_eq!(december[0].event_id, 1);
    }

    #[test]
    fn test_events_are_returned_by_value() {
        let store = EventStore::new();
        store
            .create(Event::new(1, 1, date(2024, 1, 15), "Original", ""))
            .unwrap();

        let mut listed = store.events_for_day(1, date(2024, 1, 15)).unwrap();
        listed[0].title = "Tampered".to_string();
        let mut fetched = store.get(1, 1).unwrap();
        fetched.date = date(2030, 1, 1);

        let stored = store.get(1, 1).unwrap();
        assert_eq!(stored.title, "Original");
        assert_eq!(stored.date, date(2024, 1, 15));
    }

    #[test]
    fn test_clear_drops_everything() {
        let store = EventStore::new();
        store.create(event(1, 1, date(2024, 1, 15))).unwrap();
        store.clear();

        assert_eq!(store.get(1, 1), Err(StoreError::UserNotFound));
        store.create(event(1, 1, date(2024, 1, 15))).unwrap();
    }

    #[test]
    fn test_next_event_id_strictly_increases() {
        let store = EventStore::new();
        let ids: Vec<u64> = (0..1000).map(|_| store.next_event_id()).collect();

        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_concurrent_creates_get_distinct_ids() {
        let store = Arc::new(EventStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..100)
                        .map(|_| {
                            let id = store.next_event_id();
                            store.create(event(1, id, date(2024, 1, 15))).unwrap();
                            id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: HashSet<u64> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(ids.len(), 800);
        assert_eq!(store.events_for_day(1, date(2024, 1, 15)).unwrap().len(), 800);
    }
}
