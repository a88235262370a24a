//! v003 -- Event-source entities: tasks, meetings and uploaded files.

use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    title          TEXT NOT NULL,
    description    TEXT,
    status         TEXT NOT NULL DEFAULT 'Pending',
    priority       TEXT NOT NULL DEFAULT 'Medium',
    start_date     TEXT,
    end_date       TEXT,
    owner_id       INTEGER NOT NULL,          -- FK -> users(id)
    assigned_to_id INTEGER NOT NULL,          -- FK -> users(id)
    created_at     TEXT NOT NULL,
    updated_at     TEXT,

    FOREIGN KEY (owner_id) REFERENCES users(id),
    FOREIGN KEY (assigned_to_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks(owner_id);
CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assigned_to_id);

CREATE TABLE IF NOT EXISTS meetings (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT NOT NULL,
    description  TEXT,
    start_time   TEXT NOT NULL,
    end_time     TEXT NOT NULL,
    location     TEXT,
    meeting_link TEXT,
    host_id      INTEGER NOT NULL,            -- FK -> users(id)

    FOREIGN KEY (host_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS meeting_participants (
    meeting_id INTEGER NOT NULL,
    user_id    INTEGER NOT NULL,

    PRIMARY KEY (meeting_id, user_id),
    FOREIGN KEY (meeting_id) REFERENCES meetings(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS files (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    filename        TEXT NOT NULL,
    file_path       TEXT NOT NULL,
    file_type       TEXT NOT NULL DEFAULT 'Unknown',
    file_size_bytes INTEGER NOT NULL DEFAULT 0,
    title           TEXT NOT NULL,
    description     TEXT,
    uploaded_at     TEXT NOT NULL,
    owner_id        INTEGER NOT NULL,         -- FK -> users(id)

    FOREIGN KEY (owner_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_files_owner ON files(owner_id);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
