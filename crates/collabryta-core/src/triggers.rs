//! Notifications synthesized from domain events.
//!
//! Each trigger runs after its event's primary write has committed and
//! reports through a [`FanOut`]; a failed append never undoes the event.

use collabryta_shared::constants::{
    MESSAGE_PREVIEW_CHARS, PREVIEW_ELLIPSIS, UNKNOWN_HOST_NAME, UNKNOWN_SENDER_NAME,
};
use collabryta_shared::NotificationKind;
use collabryta_store::{FileRecord, Meeting, Message, NewNotification, Task};
use tracing::warn;

use crate::directory::{name_or, Directory};
use crate::notifications::{deliver_all, FanOut, Notifier};

pub struct EventTriggers<'a> {
    notifier: &'a dyn Notifier,
    directory: &'a dyn Directory,
}

impl<'a> EventTriggers<'a> {
    pub fn new(notifier: &'a dyn Notifier, directory: &'a dyn Directory) -> Self {
        Self {
            notifier,
            directory,
        }
    }

    /// A chat message was stored: notify every other participant.
    pub fn message_sent(&self, message: &Message, participant_ids: &[i64]) -> FanOut {
        let sender = self.name_or(message.sender_id, UNKNOWN_SENDER_NAME);
        let title = format!("New Message from {sender}");
        let description = preview(&message.content);

        deliver_all(
            self.notifier,
            participant_ids
                .iter()
                .filter(|id| **id != message.sender_id)
                .map(|id| notice(*id, &title, &description, NotificationKind::Info)),
        )
    }

    /// A file upload was recorded: confirm to the uploader.
    pub fn file_uploaded(&self, file: &FileRecord) -> FanOut {
        deliver_all(
            self.notifier,
            [notice(
                file.owner_id,
                "File Uploaded",
                &format!("File '{}' uploaded successfully.", file.title),
                NotificationKind::Success,
            )],
        )
    }

    /// A meeting was scheduled: confirm to the host, invite everyone else.
    pub fn meeting_created(&self, meeting: &Meeting) -> FanOut {
        let host = self.name_or(meeting.host_id, UNKNOWN_HOST_NAME);

        let confirmation = notice(
            meeting.host_id,
            "Meeting Scheduled",
            &format!("Meeting '{}' scheduled successfully.", meeting.title),
            NotificationKind::Success,
        );
        let invitation = format!("You have been invited to '{}' by {host}.", meeting.title);
        let invitations = meeting
            .participant_ids
            .iter()
            .filter(|id| **id != meeting.host_id)
            .map(|id| notice(*id, "New Meeting Invitation", &invitation, NotificationKind::Info));

        deliver_all(
            self.notifier,
            std::iter::once(confirmation).chain(invitations),
        )
    }

    /// A task was created: tell its assignee.
    pub fn task_created(&self, task: &Task) -> FanOut {
        deliver_all(
            self.notifier,
            [notice(
                task.assigned_to_id,
                "New Task Assigned",
                &format!("Task '{}' has been assigned to you.", task.title),
                NotificationKind::Info,
            )],
        )
    }

    /// A task was updated. Only a genuine status transition notifies: the
    /// owner always, the assignee too when that is a different user. The
    /// user who made the change is not skipped.
    pub fn task_status_changed(&self, before: &Task, after: &Task) -> FanOut {
        if before.status == after.status {
            return FanOut::default();
        }

        let description = format!("Task '{}' status changed to {}.", after.title, after.status);
        let mut recipients = vec![after.owner_id];
        if after.assigned_to_id != after.owner_id {
            recipients.push(after.assigned_to_id);
        }

        deliver_all(
            self.notifier,
            recipients.into_iter().map(|id| {
                notice(id, "Task Status Updated", &description, NotificationKind::Info)
            }),
        )
    }

    fn name_or(&self, user_id: i64, fallback: &str) -> String {
        name_or(self.directory, user_id, fallback).unwrap_or_else(|e| {
            warn!(user_id, error = %e, "directory lookup failed");
            fallback.to_string()
        })
    }
}

fn notice(user_id: i64, title: &str, description: &str, kind: NotificationKind) -> NewNotification {
    NewNotification {
        user_id,
        title: title.to_string(),
        description: description.to_string(),
        kind,
    }
}

/// The first characters of a message, with an ellipsis when cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(MESSAGE_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{PREVIEW_ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}
