//! Domain model structs persisted in the relational store.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to an outer API layer.

use chrono::{DateTime, Utc};
use collabryta_shared::{FileKind, NotificationKind};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A directory record. The core reads users but never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Optional human-readable display name.
    pub name: Option<String>,
    pub role: String,
    /// Drives the online/offline badge in the conversation list.
    pub is_active: bool,
    /// Free-form presence text chosen by the user ("Offline", "Busy", ...).
    pub status: String,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to register a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// A messaging thread, either direct (two parties) or group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
    /// Stored name; direct chats usually leave it empty.
    pub name: Option<String>,
    pub is_group: bool,
    pub created_at: DateTime<Utc>,
    /// Member user ids, ascending.
    pub participant_ids: Vec<i64>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub content: String,
    /// Server-assigned, non-decreasing within a chat.
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// An entry of a user's notification feed. Content never changes after
/// creation; only `is_read` moves, and only from `false` to `true`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification to append for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub kind: NotificationKind,
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub owner_id: i64,
    pub assigned_to_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Row values for a task insert. Defaults have already been applied.
#[derive(Debug, Clone)]
pub struct TaskRow {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub owner_id: i64,
    pub assigned_to_id: i64,
}

/// Partial task update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub assigned_to_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Meeting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meeting {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub host_id: i64,
    /// Invited user ids, ascending. May include the host.
    pub participant_ids: Vec<i64>,
}

/// Row values for a meeting insert; `participant_ids` must already be
/// resolved to existing users.
#[derive(Debug, Clone)]
pub struct MeetingRow {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub host_id: i64,
    pub participant_ids: Vec<i64>,
}

// ---------------------------------------------------------------------------
// File (upload metadata)
// ---------------------------------------------------------------------------

/// Metadata for an uploaded file. The bytes live outside the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    pub id: i64,
    /// Stored (de-duplicated) file name.
    pub filename: String,
    pub file_path: String,
    pub file_type: FileKind,
    pub file_size_bytes: i64,
    pub title: String,
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub owner_id: i64,
}

#[derive(Debug, Clone)]
pub struct FileRow {
    pub filename: String,
    pub file_path: String,
    pub file_type: FileKind,
    pub file_size_bytes: i64,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: i64,
}
