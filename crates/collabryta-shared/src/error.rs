use thiserror::Error;

/// Malformed input, rejected before anything is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("End time must not be before start time")]
    InvertedTimeRange,

    #[error("A direct chat needs exactly one other participant")]
    DirectChatMembers,

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ValidationError {
    /// Reject a blank (empty or whitespace-only) required field.
    pub fn require(field: &'static str, value: &str) -> Result<(), Self> {
        if value.trim().is_empty() {
            Err(Self::EmptyField(field))
        } else {
            Ok(())
        }
    }
}
