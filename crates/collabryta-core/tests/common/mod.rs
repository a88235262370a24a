#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use collabryta_core::{CollabConfig, ManualClock, Workspace};
use collabryta_store::{Database, NewUser, User};
use tempfile::TempDir;

/// Install a log subscriber once per test binary. Output follows `RUST_LOG`.
pub fn setup_test_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 30, 0).unwrap()
}

/// A file-backed database in a temporary directory plus a manual clock.
pub struct TestEnv {
    pub db: Database,
    pub clock: ManualClock,
    pub config: CollabConfig,
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        setup_test_logging();
        let dir = tempfile::tempdir().expect("tempdir");
        let config = CollabConfig {
            database_path: Some(dir.path().join("collabryta.db")),
            upload_dir: dir.path().join("uploads"),
            ..CollabConfig::default()
        };
        let db = config.open_database().expect("open database");
        Self {
            db,
            clock: ManualClock::new(start()),
            config,
            dir,
        }
    }

    pub fn workspace(&self) -> Workspace<'_> {
        Workspace::new(&self.db, &self.clock, &self.config)
    }

    pub fn user(&self, name: &str) -> User {
        self.db
            .create_user(
                &NewUser {
                    email: format!("{}@example.com", name.to_lowercase()),
                    name: Some(name.to_string()),
                    role: None,
                },
                start(),
            )
            .expect("create user")
    }
}
