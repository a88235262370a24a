//! Notification feed rows.
//!
//! Rows are never deleted when they age out; visibility is computed at read
//! time from a `since` cutoff supplied by the caller. A row is visible when
//! `created_at > since`.

use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::database::{decode_ts, encode_ts, Database};
use crate::error::{Result, StoreError};
use crate::models::{NewNotification, Notification};

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, description, type, is_read, created_at";

impl Database {
    pub fn insert_notification(
        &self,
        notification: &NewNotification,
        now: DateTime<Utc>,
    ) -> Result<Notification> {
        self.conn().execute(
            "INSERT INTO notifications (user_id, title, description, type, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                notification.user_id,
                notification.title,
                notification.description,
                notification.kind.as_str(),
                encode_ts(&now),
            ],
        )?;
        self.get_notification(self.conn().last_insert_rowid())
    }

    pub fn get_notification(&self, id: i64) -> Result<Notification> {
        self.conn()
            .query_row(
                &format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1"),
                params![id],
                row_to_notification,
            )
            .map_err(StoreError::from_lookup)
    }

    /// Visible notifications of a user, newest first, then paginated.
    pub fn list_notifications_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Notification>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE user_id = ?1 AND created_at > ?2
             ORDER BY created_at DESC, id DESC
             LIMIT ?3 OFFSET ?4"
        ))?;

        let rows = stmt.query_map(
            params![user_id, encode_ts(&since), limit, skip],
            row_to_notification,
        )?;

        let mut notifications = Vec::new();
        for row in rows {
            notifications.push(row?);
        }
        Ok(notifications)
    }

    pub fn count_unread_notifications_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM notifications
             WHERE user_id = ?1 AND is_read = 0 AND created_at > ?2",
            params![user_id, encode_ts(&since)],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Mark one notification read and return it. No ownership check.
    pub fn mark_notification_read(&self, id: i64) -> Result<Notification> {
        let tx = self.immediate()?;
        let affected = tx.execute(
            "UPDATE notifications SET is_read = 1 WHERE id = ?1",
            params![id],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit()?;
        self.get_notification(id)
    }

    /// Mark every visible unread notification of a user read. Returns the
    /// number of rows flipped.
    pub fn mark_notifications_read_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<usize> {
        Ok(self.conn().execute(
            "UPDATE notifications SET is_read = 1
             WHERE user_id = ?1 AND is_read = 0 AND created_at > ?2",
            params![user_id, encode_ts(&since)],
        )?)
    }
}

fn row_to_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<Notification> {
    let kind: String = row.get(4)?;
    let created_str: String = row.get(6)?;

    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        kind: kind.into(),
        is_read: row.get(5)?,
        created_at: decode_ts(6, &created_str)?,
    })
}
