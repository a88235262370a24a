//! Notification store and fan-out.
//!
//! A notification is `Unread` until marked `Read`; nothing moves it back.
//! Rows are never deleted when they age out. A notification is active while
//! `now - created_at` is below the window (24 hours by default), computed
//! from the injected clock at read time.

use chrono::{DateTime, Duration, Utc};
use collabryta_shared::constants::NOTIFICATION_WINDOW_HOURS;
use collabryta_shared::{NotificationKind, ValidationError};
use collabryta_store::{Database, NewNotification, Notification};
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{CollabError, Result};

/// Sink for notifications produced by domain events.
pub trait Notifier {
    fn notify(&self, notice: &NewNotification) -> Result<Notification>;
}

/// The notification feed of every user.
pub struct NotificationCenter<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
    window: Duration,
}

impl<'a> NotificationCenter<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock) -> Self {
        Self::with_window(db, clock, Duration::hours(NOTIFICATION_WINDOW_HOURS))
    }

    pub fn with_window(db: &'a Database, clock: &'a dyn Clock, window: Duration) -> Self {
        Self { db, clock, window }
    }

    /// Append a notification stamped with the current time.
    pub fn append(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
        kind: NotificationKind,
    ) -> Result<Notification> {
        self.notify(&NewNotification {
            user_id,
            title: title.to_string(),
            description: description.to_string(),
            kind,
        })
    }

    /// Active notifications of `user_id`, newest first, then paginated.
    pub fn list_active(&self, user_id: i64, skip: u32, limit: u32) -> Result<Vec<Notification>> {
        let items = self
            .db
            .list_notifications_since(user_id, self.cutoff(), skip, limit)?;
        debug!(user_id, count = items.len(), "listed active notifications");
        Ok(items)
    }

    pub fn count_unread(&self, user_id: i64) -> Result<u64> {
        Ok(self
            .db
            .count_unread_notifications_since(user_id, self.cutoff())?)
    }

    /// Mark one notification read. Performs no ownership check; see
    /// [`NotificationCenter::mark_read_for`].
    pub fn mark_read(&self, notification_id: i64) -> Result<Notification> {
        self.db
            .mark_notification_read(notification_id)
            .map_err(CollabError::missing("notification", notification_id))
    }

    /// Mark a notification read on behalf of `user_id`, who must own it.
    pub fn mark_read_for(&self, user_id: i64, notification_id: i64) -> Result<Notification> {
        let notification = self
            .db
            .get_notification(notification_id)
            .map_err(CollabError::missing("notification", notification_id))?;
        if notification.user_id != user_id {
            return Err(CollabError::denied("notification belongs to another user"));
        }
        self.mark_read(notification_id)
    }

    /// Mark every active, unread notification of `user_id` read. Expired
    /// rows keep their state. Returns how many were flipped.
    pub fn mark_all_read(&self, user_id: i64) -> Result<usize> {
        let flipped = self
            .db
            .mark_notifications_read_since(user_id, self.cutoff())?;
        debug!(user_id, flipped, "marked notifications read");
        Ok(flipped)
    }

    /// Rows created at or before this instant are outside the window.
    fn cutoff(&self) -> DateTime<Utc> {
        self.clock
            .now()
            .checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Notifier for NotificationCenter<'_> {
    fn notify(&self, notice: &NewNotification) -> Result<Notification> {
        ValidationError::require("title", &notice.title)?;
        Ok(self.db.insert_notification(notice, self.clock.now())?)
    }
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

/// A notification that could not be appended for one recipient.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub user_id: i64,
    pub reason: String,
}

/// Outcome of delivering one event's notifications.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FanOut {
    pub delivered: Vec<Notification>,
    pub failures: Vec<DeliveryFailure>,
}

impl FanOut {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A committed primary write together with the report of its best-effort
/// notifications.
#[derive(Debug, Clone, Serialize)]
pub struct Committed<T> {
    pub value: T,
    pub fan_out: FanOut,
}

impl<T> Committed<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Append one notification per notice. Failures are logged and collected,
/// never propagated: the caller's primary write is already committed.
pub fn deliver_all(
    notifier: &dyn Notifier,
    notices: impl IntoIterator<Item = NewNotification>,
) -> FanOut {
    let mut report = FanOut::default();
    for notice in notices {
        match notifier.notify(&notice) {
            Ok(notification) => report.delivered.push(notification),
            Err(e) => {
                warn!(
                    user_id = notice.user_id,
                    title = %notice.title,
                    error = %e,
                    "notification delivery failed"
                );
                report.failures.push(DeliveryFailure {
                    user_id: notice.user_id,
                    reason: e.to_string(),
                });
            }
        }
    }
    report
}
