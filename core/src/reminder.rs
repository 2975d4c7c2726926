//! Time-of-day reminders.
//!
//! A reminder is due when an enabled entry's "HH:MM" equals the current local
//! minute. Matching is exact, so a minute in which no check runs (host asleep,
//! timer drift) is skipped for that day. There is no catch-up.

use chrono::{Local, NaiveDateTime, Timelike};

use crate::models::{Notification, NotificationTime, RegimenEntry};
use crate::regimen::RegimenStore;

/// Source of local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// One notification per enabled entry scheduled for `now`.
#[must_use]
pub fn due_notifications(entries: &[RegimenEntry], now: NotificationTime) -> Vec<Notification> {
    entries
        .iter()
        .filter(|e| e.reminder_time() == Some(now))
        .map(|e| Notification::for_entry(e, now))
        .collect()
}

/// Runs the reminder check at most once per wall-clock minute.
#[derive(Debug, Default)]
pub struct ReminderChecker {
    last_checked: Option<NaiveDateTime>,
}

impl ReminderChecker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `store` against `clock`. A second tick inside a minute that was
    /// already checked returns nothing.
    pub fn tick(&mut self, store: &RegimenStore, clock: &dyn Clock) -> Vec<Notification> {
        let now = clock.now();
        let minute = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);
        if self.last_checked == Some(minute) {
            return Vec::new();
        }
        self.last_checked = Some(minute);

        let due = due_notifications(store.list(), NotificationTime::from_time(now.time()));
        for n in &due {
            tracing::info!(product = %n.product_name, time = %n.time, "reminder due");
        }
        due
    }
}
