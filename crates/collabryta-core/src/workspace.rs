//! One unit of work: a store handle, a clock and configuration, handed to
//! each service on demand.

use collabryta_store::{Chat, Database, Message, Notification};

use crate::clock::Clock;
use crate::config::CollabConfig;
use crate::conversations::{ConversationAggregator, ConversationSummary};
use crate::directory::Directory;
use crate::error::Result;
use crate::files::FileService;
use crate::meetings::MeetingService;
use crate::messaging::{Messenger, NewChat};
use crate::notifications::{Committed, NotificationCenter};
use crate::tasks::TaskService;

/// Entry point for callers such as an HTTP layer.
///
/// The store doubles as the participant directory and the notification
/// center is the notifier behind every event trigger.
pub struct Workspace<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
    config: &'a CollabConfig,
    notifications: NotificationCenter<'a>,
}

impl<'a> Workspace<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock, config: &'a CollabConfig) -> Self {
        Self {
            db,
            clock,
            config,
            notifications: NotificationCenter::with_window(db, clock, config.notification_window()),
        }
    }

    pub fn notifications(&self) -> &NotificationCenter<'a> {
        &self.notifications
    }

    pub fn conversations(&self) -> ConversationAggregator<'a> {
        ConversationAggregator::new(self.db, self.directory())
    }

    pub fn messenger(&self) -> Messenger<'_> {
        Messenger::new(self.db, self.clock, self.directory(), &self.notifications)
    }

    pub fn tasks(&self) -> TaskService<'_> {
        TaskService::new(self.db, self.clock, self.directory(), &self.notifications)
    }

    pub fn meetings(&self) -> MeetingService<'_> {
        MeetingService::new(self.db, self.clock, self.directory(), &self.notifications)
            .with_recent_window(self.config.recent_meeting_window())
    }

    pub fn files(&self) -> FileService<'_> {
        FileService::new(
            self.db,
            self.clock,
            self.directory(),
            &self.notifications,
            &self.config.upload_dir,
        )
    }

    fn directory(&self) -> &'a dyn Directory {
        self.db
    }

    // -- chat and messaging --

    pub fn list_conversations(&self, user_id: i64) -> Result<Vec<ConversationSummary>> {
        self.conversations().list(user_id)
    }

    pub fn create_chat(&self, creator_id: i64, request: &NewChat) -> Result<Chat> {
        self.messenger().create_chat(creator_id, request)
    }

    pub fn send_message(&self, chat_id: i64, sender_id: i64, text: &str) -> Result<Committed<Message>> {
        self.messenger().send_message(chat_id, sender_id, text)
    }

    pub fn list_messages(&self, chat_id: i64, user_id: i64) -> Result<Vec<Message>> {
        self.messenger().list_messages(chat_id, user_id)
    }

    pub fn mark_chat_read(&self, chat_id: i64, user_id: i64) -> Result<bool> {
        self.messenger().mark_chat_read(chat_id, user_id)
    }

    // -- notifications --

    /// The first page of active notifications, sized by the configured limit.
    pub fn list_active_notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        self.notifications
            .list_active(user_id, 0, self.config.notification_page_limit)
    }

    pub fn count_unread_notifications(&self, user_id: i64) -> Result<u64> {
        self.notifications.count_unread(user_id)
    }

    /// Mark one notification read after checking it belongs to `user_id`.
    pub fn mark_notification_read(&self, user_id: i64, notification_id: i64) -> Result<Notification> {
        self.notifications.mark_read_for(user_id, notification_id)
    }

    pub fn mark_all_notifications_read(&self, user_id: i64) -> Result<usize> {
        self.notifications.mark_all_read(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::NewTask;
    use crate::testing::Fixture;
    use chrono::Duration;

    #[test]
    fn configured_windows_reach_the_services() {
        let fx = Fixture::new();
        let ana = fx.user("Ana");
        let config = CollabConfig {
            notification_window_hours: 1,
            notification_page_limit: 2,
            ..CollabConfig::default()
        };
        let ws = Workspace::new(&fx.db, &fx.clock, &config);

        for title in ["a", "b", "c"] {
            ws.tasks()
                .create(
                    ana.id,
                    &NewTask {
                        title: title.into(),
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        assert_eq!(ws.list_active_notifications(ana.id).unwrap().len(), 2);
        assert_eq!(ws.count_unread_notifications(ana.id).unwrap(), 3);

        fx.clock.advance(Duration::hours(1));
        assert!(ws.list_active_notifications(ana.id).unwrap().is_empty());
        assert_eq!(ws.count_unread_notifications(ana.id).unwrap(), 0);
    }

    #[test]
    fn notification_read_checks_the_owner() {
        let fx = Fixture::new();
        let ana = fx.user("Ana");
        let ben = fx.user("Ben");
        let config = CollabConfig::default();
        let ws = Workspace::new(&fx.db, &fx.clock, &config);
        let chat = ws
            .create_chat(
                ana.id,
                &NewChat {
                    is_group: false,
                    name: None,
                    participant_ids: vec![ben.id],
                },
            )
            .unwrap();
        let sent = ws.send_message(chat.id, ana.id, "ping").unwrap();
        let notice = &sent.fan_out.delivered[0];

        assert!(ws.mark_notification_read(ana.id, notice.id).is_err());
        assert!(ws.mark_notification_read(ben.id, notice.id).unwrap().is_read);
        assert_eq!(ws.mark_all_notifications_read(ben.id).unwrap(), 0);
        assert_eq!(ws.list_conversations(ben.id).unwrap()[0].unread_count, 1);
        assert!(ws.mark_chat_read(chat.id, ben.id).unwrap());
        assert_eq!(ws.list_conversations(ben.id).unwrap()[0].unread_count, 0);
        assert_eq!(ws.list_messages(chat.id, ben.id).unwrap().len(), 1);
    }
}
