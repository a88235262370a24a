//! # collabryta-core
//!
//! The notification fan-out and conversation-aggregation engine of the
//! Collabryta collaboration backend.
//!
//! This crate provides:
//! - **Conversation aggregation**: per-user chat summaries with last message,
//!   unread count and peer presence
//! - **Message delivery**: membership-checked sends, bulk mark-read and
//!   idempotent direct-chat creation
//! - **Notification store**: an append-only feed with a rolling visibility
//!   window and monotonic read state
//! - **Event triggers**: notifications synthesized from task, meeting, file
//!   and message events, committed after (and never instead of) the primary
//!   write
//!
//! Every component receives its collaborators (store handle, clock,
//! directory, notifier) at construction time. Nothing is cached between
//! calls; [`Workspace`] wires one unit of work together.

pub mod clock;
pub mod config;
pub mod conversations;
pub mod directory;
pub mod error;
pub mod files;
pub mod meetings;
pub mod messaging;
pub mod notifications;
pub mod tasks;
pub mod triggers;
pub mod workspace;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CollabConfig;
pub use conversations::{ConversationAggregator, ConversationSummary};
pub use directory::{Directory, Profile};
pub use error::{CollabError, Result};
pub use files::{FileService, NewUpload};
pub use meetings::{MeetingService, NewMeeting};
pub use messaging::{Messenger, NewChat};
pub use notifications::{Committed, DeliveryFailure, FanOut, NotificationCenter, Notifier};
pub use tasks::{NewTask, TaskService};
pub use triggers::EventTriggers;
pub use workspace::Workspace;

#[cfg(test)]
pub(crate) mod testing;
