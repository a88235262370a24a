//! # collabryta-store
//!
//! Relational persistence for the Collabryta collaboration backend, backed by
//! SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers and named queries
//! for every domain model. Operations that read and then write several rows
//! run inside a single `BEGIN IMMEDIATE` transaction so concurrent callers on
//! other connections cannot interleave with them.

pub mod chats;
pub mod database;
pub mod files;
pub mod meetings;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod notifications;
pub mod tasks;
pub mod users;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;

#[cfg(test)]
pub(crate) mod testing;
