use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::database::{decode_opt_ts, decode_ts, encode_ts, Database};
use crate::error::{Result, StoreError};
use crate::models::{Task, TaskChanges, TaskRow};

const TASK_COLUMNS: &str = "id, title, description, status, priority, start_date, end_date, \
                            owner_id, assigned_to_id, created_at, updated_at";

impl Database {
    pub fn insert_task(&self, task: &TaskRow, now: DateTime<Utc>) -> Result<Task> {
        self.conn().execute(
            "INSERT INTO tasks (title, description, status, priority, start_date, end_date,
                                owner_id, assigned_to_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                task.title,
                task.description,
                task.status,
                task.priority,
                task.start_date.as_ref().map(encode_ts),
                task.end_date.as_ref().map(encode_ts),
                task.owner_id,
                task.assigned_to_id,
                encode_ts(&now),
            ],
        )?;
        self.get_task(self.conn().last_insert_rowid())
    }

    pub fn get_task(&self, id: i64) -> Result<Task> {
        get_task(self.conn(), id)
    }

    /// Tasks owned by or assigned to `user_id`, ordered by id.
    pub fn list_tasks_for_user(&self, user_id: i64) -> Result<Vec<Task>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE owner_id = ?1 OR assigned_to_id = ?1
             ORDER BY id ASC"
        ))?;

        let rows = stmt.query_map(params![user_id], row_to_task)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Apply a partial update and return `(before, after)`.
    ///
    /// Both snapshots come from the same immediate transaction as the write,
    /// so a status transition seen by the caller is the one that was actually
    /// committed. Returns `Ok(None)` and writes nothing unless `actor_id` is
    /// the owner or assignee at that point.
    pub fn update_task(
        &self,
        id: i64,
        actor_id: i64,
        changes: &TaskChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<(Task, Task)>> {
        let tx = self.immediate()?;
        let before = get_task(&tx, id)?;
        if before.owner_id != actor_id && before.assigned_to_id != actor_id {
            return Ok(None);
        }

        tx.execute(
            "UPDATE tasks SET
                title          = COALESCE(?1, title),
                description    = COALESCE(?2, description),
                status         = COALESCE(?3, status),
                priority       = COALESCE(?4, priority),
                start_date     = COALESCE(?5, start_date),
                end_date       = COALESCE(?6, end_date),
                assigned_to_id = COALESCE(?7, assigned_to_id),
                updated_at     = ?8
             WHERE id = ?9",
            params![
                changes.title,
                changes.description,
                changes.status,
                changes.priority,
                changes.start_date.as_ref().map(encode_ts),
                changes.end_date.as_ref().map(encode_ts),
                changes.assigned_to_id,
                encode_ts(&now),
                id,
            ],
        )?;

        let after = get_task(&tx, id)?;
        tx.commit()?;
        Ok(Some((before, after)))
    }

    pub fn delete_task(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

fn get_task(conn: &Connection, id: i64) -> Result<Task> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        params![id],
        row_to_task,
    )
    .map_err(StoreError::from_lookup)
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let start: Option<String> = row.get(5)?;
    let end: Option<String> = row.get(6)?;
    let created_str: String = row.get(9)?;
    let updated: Option<String> = row.get(10)?;

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        priority: row.get(4)?,
        start_date: decode_opt_ts(5, start)?,
        end_date: decode_opt_ts(6, end)?,
        owner_id: row.get(7)?,
        assigned_to_id: row.get(8)?,
        created_at: decode_ts(9, &created_str)?,
        updated_at: decode_opt_ts(10, updated)?,
    })
}
