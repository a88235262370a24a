//! Task lifecycle. Tasks matter to the core as sources of assignment and
//! status-change notifications.

use chrono::{DateTime, Utc};
use collabryta_shared::constants::{DEFAULT_TASK_PRIORITY, DEFAULT_TASK_STATUS};
use collabryta_shared::ValidationError;
use collabryta_store::{Database, Task, TaskChanges, TaskRow};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::directory::Directory;
use crate::error::{CollabError, Result};
use crate::notifications::{Committed, Notifier};
use crate::triggers::EventTriggers;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `"Pending"`.
    pub status: Option<String>,
    /// Defaults to `"Medium"`.
    pub priority: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Defaults to the owner.
    pub assigned_to_id: Option<i64>,
}

pub struct TaskService<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
    triggers: EventTriggers<'a>,
}

impl<'a> TaskService<'a> {
    pub fn new(
        db: &'a Database,
        clock: &'a dyn Clock,
        directory: &'a dyn Directory,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            db,
            clock,
            triggers: EventTriggers::new(notifier, directory),
        }
    }

    /// Create a task owned by `owner_id` and tell the assignee about it.
    pub fn create(&self, owner_id: i64, task: &NewTask) -> Result<Committed<Task>> {
        ValidationError::require("title", &task.title)?;
        let status = non_blank_or("status", task.status.as_deref(), DEFAULT_TASK_STATUS)?;
        let priority = non_blank_or("priority", task.priority.as_deref(), DEFAULT_TASK_PRIORITY)?;
        let assigned_to_id = task.assigned_to_id.unwrap_or(owner_id);

        self.require_user(owner_id)?;
        self.require_user(assigned_to_id)?;

        let task = self.db.insert_task(
            &TaskRow {
                title: task.title.trim().to_string(),
                description: task.description.clone(),
                status,
                priority,
                start_date: task.start_date,
                end_date: task.end_date,
                owner_id,
                assigned_to_id,
            },
            self.clock.now(),
        )?;
        info!(task_id = task.id, owner_id, assigned_to_id, "task created");

        let fan_out = self.triggers.task_created(&task);
        Ok(Committed {
            value: task,
            fan_out,
        })
    }

    /// A task visible to its owner or assignee.
    pub fn get(&self, actor_id: i64, task_id: i64) -> Result<Task> {
        let task = self.load(task_id)?;
        if !involves(&task, actor_id) {
            return Err(not_involved(actor_id, task_id));
        }
        Ok(task)
    }

    /// Tasks owned by or assigned to `user_id`, ordered by id.
    pub fn list_for_user(&self, user_id: i64) -> Result<Vec<Task>> {
        Ok(self.db.list_tasks_for_user(user_id)?)
    }

    /// Apply a partial update on behalf of the owner or assignee.
    ///
    /// When the committed write changed the status, the owner and assignee
    /// are notified.
    pub fn update(
        &self,
        actor_id: i64,
        task_id: i64,
        changes: &TaskChanges,
    ) -> Result<Committed<Task>> {
        if let Some(title) = &changes.title {
            ValidationError::require("title", title)?;
        }
        if let Some(status) = &changes.status {
            ValidationError::require("status", status)?;
        }
        if let Some(priority) = &changes.priority {
            ValidationError::require("priority", priority)?;
        }

        self.get(actor_id, task_id)?;
        if let Some(assignee) = changes.assigned_to_id {
            self.require_user(assignee)?;
        }

        // ownership may have moved since the check above
        let (before, after) = self
            .db
            .update_task(task_id, actor_id, changes, self.clock.now())
            .map_err(CollabError::missing("task", task_id))?
            .ok_or_else(|| not_involved(actor_id, task_id))?;
        info!(task_id, actor_id, status = %after.status, "task updated");

        let fan_out = self.triggers.task_status_changed(&before, &after);
        Ok(Committed {
            value: after,
            fan_out,
        })
    }

    /// Delete a task. Only the owner may do this.
    pub fn delete(&self, actor_id: i64, task_id: i64) -> Result<Task> {
        let task = self.load(task_id)?;
        if task.owner_id != actor_id {
            return Err(CollabError::denied(format!(
                "only the owner can delete task {task_id}"
            )));
        }
        if !self.db.delete_task(task_id)? {
            return Err(CollabError::NotFound {
                entity: "task",
                id: task_id,
            });
        }
        info!(task_id, actor_id, "task deleted");
        Ok(task)
    }

    fn load(&self, task_id: i64) -> Result<Task> {
        self.db
            .get_task(task_id)
            .map_err(CollabError::missing("task", task_id))
    }

    fn require_user(&self, user_id: i64) -> Result<()> {
        match self.db.find_user(user_id)? {
            Some(_) => Ok(()),
            None => Err(CollabError::NotFound {
                entity: "user",
                id: user_id,
            }),
        }
    }
}

fn involves(task: &Task, user_id: i64) -> bool {
    task.owner_id == user_id || task.assigned_to_id == user_id
}

fn not_involved(actor_id: i64, task_id: i64) -> CollabError {
    CollabError::denied(format!(
        "user {actor_id} is neither owner nor assignee of task {task_id}"
    ))
}

fn non_blank_or(
    field: &'static str,
    value: Option<&str>,
    default: &str,
) -> std::result::Result<String, ValidationError> {
    match value {
        Some(v) => {
            ValidationError::require(field, v)?;
            Ok(v.trim().to_string())
        }
        None => Ok(default.to_string()),
    }
}
