use collabryta_shared::ValidationError;
use collabryta_store::StoreError;
use thiserror::Error;

/// Errors returned by core operations.
///
/// Failed notification deliveries are not represented here: they are
/// reported through [`FanOut`](crate::FanOut) next to the committed result.
#[derive(Error, Debug)]
pub enum CollabError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User {user_id} is not a member of chat {chat_id}")]
    Membership { chat_id: i64, user_id: i64 },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CollabError {
    /// Error mapper for single-record lookups: a store-level `NotFound`
    /// becomes a `NotFound` naming the entity and id.
    pub(crate) fn missing(entity: &'static str, id: i64) -> impl FnOnce(StoreError) -> Self {
        move |e| match e {
            StoreError::NotFound => CollabError::NotFound { entity, id },
            other => CollabError::Store(other),
        }
    }

    pub(crate) fn denied(reason: impl Into<String>) -> Self {
        CollabError::PermissionDenied(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, CollabError>;
