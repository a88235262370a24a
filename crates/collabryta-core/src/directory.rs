//! Participant directory: the identity and presence the core shows for a
//! user id.

use collabryta_store::{Database, StoreError, User};
use serde::{Deserialize, Serialize};

/// What the core needs to know about a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub name: Option<String>,
    pub is_active: bool,
}

impl Profile {
    /// The display name, if the user has a non-blank one.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            is_active: user.is_active,
        }
    }
}

pub trait Directory {
    /// Resolve a user id. Absence is `Ok(None)`, not an error.
    fn lookup(&self, user_id: i64) -> Result<Option<Profile>, StoreError>;
}

impl Directory for Database {
    fn lookup(&self, user_id: i64) -> Result<Option<Profile>, StoreError> {
        Ok(self.find_user(user_id)?.map(Profile::from))
    }
}

/// Display name of `user_id`, or `fallback` when the user is unknown or
/// unnamed.
pub(crate) fn name_or(
    directory: &dyn Directory,
    user_id: i64,
    fallback: &str,
) -> Result<String, StoreError> {
    Ok(directory
        .lookup(user_id)?
        .as_ref()
        .and_then(Profile::display_name)
        .unwrap_or(fallback)
        .to_string())
}
