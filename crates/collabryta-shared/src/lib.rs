//! Vocabulary shared by the Collabryta store and core crates.

pub mod constants;
pub mod error;
pub mod types;

pub use error::ValidationError;
pub use types::{FileKind, NotificationKind, Presence};
