use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS notifications (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL,             -- FK -> users(id)
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    type        TEXT NOT NULL DEFAULT 'info', -- free-form category tag
    is_read     INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,                -- RFC-3339

    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Window queries filter by owner and creation time.
CREATE INDEX IF NOT EXISTS idx_notifications_user_created
    ON notifications(user_id, created_at DESC);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
