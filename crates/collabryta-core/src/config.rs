//! Engine configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the engine can start with zero
//! configuration for local development.

use std::path::PathBuf;

use chrono::Duration;
use collabryta_shared::constants::{
    DEFAULT_NOTIFICATION_LIMIT, NOTIFICATION_WINDOW_HOURS, RECENT_MEETING_HOURS,
};
use collabryta_store::{Database, StoreError};

#[derive(Debug, Clone)]
pub struct CollabConfig {
    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: platform data directory (`collabryta.db`).
    pub database_path: Option<PathBuf>,

    /// Directory uploaded files are recorded under.
    /// Env: `UPLOAD_DIR`
    /// Default: `./uploads`
    pub upload_dir: PathBuf,

    /// How long a notification stays visible, in hours.
    /// Env: `NOTIFICATION_WINDOW_HOURS`
    /// Default: `24`
    pub notification_window_hours: i64,

    /// Trailing window for the "recent meetings" listing, in hours.
    /// Env: `RECENT_MEETING_HOURS`
    /// Default: `48`
    pub recent_meeting_hours: i64,

    /// Page size used when a caller does not ask for one.
    /// Env: `NOTIFICATION_PAGE_LIMIT`
    /// Default: `100`
    pub notification_page_limit: u32,
}

impl Default for CollabConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            upload_dir: PathBuf::from("./uploads"),
            notification_window_hours: NOTIFICATION_WINDOW_HOURS,
            recent_meeting_hours: RECENT_MEETING_HOURS,
            notification_page_limit: DEFAULT_NOTIFICATION_LIMIT,
        }
    }
}

impl CollabConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("DATABASE_PATH") {
            if !path.is_empty() {
                config.database_path = Some(PathBuf::from(path));
            }
        }

        if let Some(dir) = lookup("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }

        if let Some(val) = lookup("NOTIFICATION_WINDOW_HOURS") {
            match parse_window_hours(&val) {
                Some(hours) => config.notification_window_hours = hours,
                None => tracing::warn!(
                    value = %val,
                    "Invalid NOTIFICATION_WINDOW_HOURS, using default"
                ),
            }
        }

        if let Some(val) = lookup("RECENT_MEETING_HOURS") {
            match parse_window_hours(&val) {
                Some(hours) => config.recent_meeting_hours = hours,
                None => tracing::warn!(
                    value = %val,
                    "Invalid RECENT_MEETING_HOURS, using default"
                ),
            }
        }

        if let Some(val) = lookup("NOTIFICATION_PAGE_LIMIT") {
            match val.parse::<u32>() {
                Ok(n) if n > 0 => config.notification_page_limit = n,
                _ => tracing::warn!(
                    value = %val,
                    "Invalid NOTIFICATION_PAGE_LIMIT, using default"
                ),
            }
        }

        config
    }

    pub fn notification_window(&self) -> Duration {
        window(self.notification_window_hours)
    }

    pub fn recent_meeting_window(&self) -> Duration {
        window(self.recent_meeting_hours)
    }

    /// Open the configured database, running pending migrations.
    pub fn open_database(&self) -> Result<Database, StoreError> {
        match &self.database_path {
            Some(path) => Database::open_at(path),
            None => Database::new(),
        }
    }
}

/// Upper bound for configured windows: a hundred years.
const MAX_WINDOW_HOURS: i64 = 100 * 365 * 24;

fn parse_window_hours(val: &str) -> Option<i64> {
    val.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| (1..=MAX_WINDOW_HOURS).contains(n))
}

// Fields are public, so a window set in code may still be out of range.
fn window(hours: i64) -> Duration {
    Duration::try_hours(hours.clamp(0, MAX_WINDOW_HOURS)).unwrap_or(Duration::MAX)
}
