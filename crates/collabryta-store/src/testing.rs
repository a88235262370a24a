use chrono::Utc;

use crate::{Database, NewUser, User};

pub(crate) fn db() -> Database {
    Database::open_in_memory().expect("in-memory database")
}

pub(crate) fn user(db: &Database, name: &str) -> User {
    db.create_user(
        &NewUser {
            email: format!("{}@example.com", name.to_lowercase()),
            name: Some(name.to_string()),
            role: None,
        },
        Utc::now(),
    )
    .expect("create user")
}
