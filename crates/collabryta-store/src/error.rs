use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No platform data directory to put the default database in.
    #[error("Could not determine application data directory")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A lookup by id matched no row.
    #[error("Record not found")]
    NotFound,

    /// A direct chat needs two distinct members.
    #[error("A direct chat needs two distinct members")]
    DirectChatMembers,

    /// A schema step failed; the message names the step.
    #[error("Migration error: {0}")]
    Migration(String),
}

impl StoreError {
    /// Error mapper for single-row lookups: "no rows" becomes `NotFound`.
    pub(crate) fn from_lookup(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::Sqlite(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
