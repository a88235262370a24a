use chrono::{DateTime, TimeZone, Utc};
use collabryta_store::{Database, NewUser, User};

use crate::clock::ManualClock;
use crate::directory::Directory;
use crate::notifications::NotificationCenter;

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
}

pub(crate) struct Fixture {
    pub db: Database,
    pub clock: ManualClock,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            db: Database::open_in_memory().expect("in-memory database"),
            clock: ManualClock::new(t0()),
        }
    }

    pub fn user(&self, name: &str) -> User {
        let email = format!("{}.{}@example.com", name.trim().to_lowercase(), name.len());
        self.db
            .create_user(
                &NewUser {
                    email,
                    name: Some(name.to_string()),
                    role: None,
                },
                t0(),
            )
            .expect("create user")
    }

    pub fn notifications(&self) -> NotificationCenter<'_> {
        NotificationCenter::new(&self.db, &self.clock)
    }

    pub fn directory(&self) -> &dyn Directory {
        &self.db
    }

    pub fn titles_for(&self, user_id: i64) -> Vec<String> {
        self.notifications()
            .list_active(user_id, 0, 100)
            .expect("list notifications")
            .into_iter()
            .map(|n| n.title)
            .collect()
    }
}
