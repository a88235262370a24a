mod common;

use chrono::Duration;
use collabryta_core::messaging::{Messenger, NewChat};
use collabryta_core::tasks::NewTask;
use collabryta_core::{CollabError, NotificationCenter, Notifier};
use collabryta_shared::NotificationKind;
use collabryta_store::{Database, NewNotification, Notification, TaskChanges};

use common::TestEnv;

fn direct(other: i64) -> NewChat {
    NewChat {
        is_group: false,
        name: None,
        participant_ids: vec![other],
    }
}

fn group(name: &str, members: &[i64]) -> NewChat {
    NewChat {
        is_group: true,
        name: Some(name.to_string()),
        participant_ids: members.to_vec(),
    }
}

#[test]
fn conversations_list_exactly_the_chats_a_user_is_in() {
    let env = TestEnv::new();
    let ws = env.workspace();
    let [a, b, c, d] = ["Ana", "Ben", "Cleo", "Dev"].map(|n| env.user(n).id);

    let ab = ws.create_chat(a, &direct(b)).unwrap();
    let abc = ws.create_chat(a, &group("Team", &[b, c])).unwrap();
    let cd = ws.create_chat(c, &direct(d)).unwrap();
    let solo = ws.create_chat(d, &group("Notes", &[])).unwrap();

    let ids = |user| -> Vec<i64> {
        let mut ids: Vec<i64> = ws
            .list_conversations(user)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        ids.sort_unstable();
        ids
    };

    assert_eq!(ids(a), vec![ab.id, abc.id]);
    assert_eq!(ids(b), vec![ab.id, abc.id]);
    assert_eq!(ids(c), vec![abc.id, cd.id]);
    assert_eq!(ids(d), vec![cd.id, solo.id]);
}

#[test]
fn non_member_send_is_rejected_without_a_row() {
    let env = TestEnv::new();
    let ws = env.workspace();
    let [a, b, eve] = ["Ana", "Ben", "Eve"].map(|n| env.user(n).id);
    let chat = ws.create_chat(a, &direct(b)).unwrap();

    let err = ws.send_message(chat.id, eve, "let me in").unwrap_err();

    assert!(matches!(err, CollabError::Membership { chat_id, user_id } if chat_id == chat.id && user_id == eve));
    assert!(env.db.list_messages(chat.id).unwrap().is_empty());
    assert_eq!(ws.count_unread_notifications(a).unwrap(), 0);
    assert_eq!(ws.count_unread_notifications(b).unwrap(), 0);
}

#[test]
fn existing_direct_chat_is_returned_from_either_side() {
    let env = TestEnv::new();
    let ws = env.workspace();
    let [a, b] = ["Ana", "Ben"].map(|n| env.user(n).id);

    let existing = ws.create_chat(a, &direct(b)).unwrap();
    let from_a = ws.create_chat(a, &direct(b)).unwrap();
    let from_b = ws.create_chat(b, &direct(a)).unwrap();

    assert_eq!(from_a.id, existing.id);
    assert_eq!(from_b.id, existing.id);
    assert_eq!(from_a, existing);
    assert_eq!(env.db.list_participants(existing.id).unwrap(), vec![a, b]);
    assert_eq!(env.db.list_chats_for_user(a).unwrap().len(), 1);
}

#[test]
fn marking_a_chat_read_twice_changes_nothing_the_second_time() {
    let env = TestEnv::new();
    let ws = env.workspace();
    let [a, b] = ["Ana", "Ben"].map(|n| env.user(n).id);
    let chat = ws.create_chat(a, &direct(b)).unwrap();
    ws.send_message(chat.id, a, "one").unwrap();
    ws.send_message(chat.id, a, "two").unwrap();

    assert_eq!(ws.list_conversations(b).unwrap()[0].unread_count, 2);
    ws.mark_chat_read(chat.id, b).unwrap();
    assert_eq!(ws.list_conversations(b).unwrap()[0].unread_count, 0);
    ws.mark_chat_read(chat.id, b).unwrap();
    assert_eq!(ws.list_conversations(b).unwrap()[0].unread_count, 0);
}

#[test]
fn notification_is_visible_for_exactly_one_window() {
    let env = TestEnv::new();
    let ws = env.workspace();
    let a = env.user("Ana").id;
    let created = ws
        .notifications()
        .append(a, "Heads up", "", NotificationKind::Warning)
        .unwrap();
    let visible = |ws: &collabryta_core::Workspace<'_>| {
        ws.list_active_notifications(a)
            .unwrap()
            .iter()
            .any(|n| n.id == created.id)
    };

    assert!(visible(&ws));
    env.clock.advance(Duration::hours(12));
    assert!(visible(&ws));
    env.clock.set(created.created_at + Duration::hours(24) - Duration::microseconds(1));
    assert!(visible(&ws));
    env.clock.set(created.created_at + Duration::hours(24));
    assert!(!visible(&ws));
    env.clock.advance(Duration::days(30));
    assert!(!visible(&ws));

    // expiry hides the row, it does not remove it
    assert_eq!(env.db.get_notification(created.id).unwrap().title, "Heads up");
}

#[test]
fn read_notifications_stay_read() {
    let env = TestEnv::new();
    let ws = env.workspace();
    let a = env.user("Ana").id;
    let center = ws.notifications();
    let first = center.append(a, "One", "", NotificationKind::Info).unwrap();
    center.append(a, "Two", "", NotificationKind::Info).unwrap();

    ws.mark_notification_read(a, first.id).unwrap();
    assert_eq!(ws.count_unread_notifications(a).unwrap(), 1);
    assert_eq!(ws.mark_all_notifications_read(a).unwrap(), 1);
    assert_eq!(ws.mark_all_notifications_read(a).unwrap(), 0);
    ws.mark_notification_read(a, first.id).unwrap();

    assert!(ws.list_active_notifications(a).unwrap().iter().all(|n| n.is_read));
    env.clock.advance(Duration::days(2));
    assert!(env.db.get_notification(first.id).unwrap().is_read);
}

#[test]
fn assigning_a_task_notifies_the_assignee_once() {
    let env = TestEnv::new();
    let ws = env.workspace();
    let [a, b] = ["Ana", "Ben"].map(|n| env.user(n).id);

    ws.tasks()
        .create(
            a,
            &NewTask {
                title: "Draft roadmap".into(),
                assigned_to_id: Some(b),
                ..Default::default()
            },
        )
        .unwrap();

    let inbox = ws.list_active_notifications(b).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].title, "New Task Assigned");
    assert!(inbox[0].description.contains("Draft roadmap"));
    assert!(ws.list_active_notifications(a).unwrap().is_empty());
}

#[test]
fn group_message_reaches_everyone_but_the_sender() {
    let env = TestEnv::new();
    let ws = env.workspace();
    let [a, b, c] = ["Ana", "Ben", "Cleo"].map(|n| env.user(n).id);
    let chat = ws.create_chat(a, &group("Team", &[b, c])).unwrap();

    let sent = ws.send_message(chat.id, a, "hello").unwrap();

    assert!(sent.fan_out.is_complete());
    let mut recipients: Vec<_> = sent.fan_out.delivered.iter().map(|n| n.user_id).collect();
    recipients.sort_unstable();
    assert_eq!(recipients, vec![b, c]);
    assert!(ws.list_active_notifications(a).unwrap().is_empty());

    let summary = &ws.list_conversations(b).unwrap()[0];
    assert_eq!(summary.id, chat.id);
    assert_eq!(summary.name, "Team");
    assert_eq!(summary.last_message.as_deref(), Some("hello"));
    assert_eq!(summary.unread_count, 1);
    assert_eq!(ws.list_conversations(a).unwrap()[0].unread_count, 0);
}

#[test]
fn assignee_completing_a_task_notifies_owner_and_assignee() {
    let env = TestEnv::new();
    let ws = env.workspace();
    let [owner, assignee] = ["Ana", "Ben"].map(|n| env.user(n).id);
    let task = ws
        .tasks()
        .create(
            owner,
            &NewTask {
                title: "Release notes".into(),
                assigned_to_id: Some(assignee),
                ..Default::default()
            },
        )
        .unwrap()
        .into_inner();
    ws.mark_all_notifications_read(assignee).unwrap();

    let updated = ws
        .tasks()
        .update(
            assignee,
            task.id,
            &TaskChanges {
                status: Some("Completed".into()),
                ..Default::default()
            },
        )
        .unwrap();

    let delivered = &updated.fan_out.delivered;
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered.iter().filter(|n| n.user_id == owner).count(), 1);
    assert_eq!(delivered.iter().filter(|n| n.user_id == assignee).count(), 1);
    assert!(delivered.iter().all(|n| n.title == "Task Status Updated"));
    assert_eq!(ws.count_unread_notifications(owner).unwrap(), 1);
    assert_eq!(ws.count_unread_notifications(assignee).unwrap(), 1);
}

struct Unreachable;

impl Notifier for Unreachable {
    fn notify(&self, notice: &NewNotification) -> collabryta_core::Result<Notification> {
        Err(CollabError::PermissionDenied(format!(
            "feed of user {} is offline",
            notice.user_id
        )))
    }
}

#[test]
fn failed_fan_out_never_undoes_the_message() {
    let env = TestEnv::new();
    let [a, b] = ["Ana", "Ben"].map(|n| env.user(n).id);
    let directory: &Database = &env.db;
    let messenger = Messenger::new(&env.db, &env.clock, directory, &Unreachable);
    let chat = messenger.create_chat(a, &direct(b)).unwrap();

    let sent = messenger.send_message(chat.id, a, "are you there?").unwrap();

    assert!(!sent.fan_out.is_complete());
    assert_eq!(sent.fan_out.failures.len(), 1);
    assert_eq!(sent.fan_out.failures[0].user_id, b);
    assert_eq!(env.db.list_messages(chat.id).unwrap(), vec![sent.value.clone()]);

    let center = NotificationCenter::new(&env.db, &env.clock);
    assert_eq!(center.count_unread(b).unwrap(), 0);
    assert_eq!(env.workspace().list_conversations(b).unwrap()[0].unread_count, 1);
}

#[test]
fn data_survives_reopening_the_database() {
    let env = TestEnv::new();
    let [a, b] = ["Ana", "Ben"].map(|n| env.user(n).id);
    let chat = env.workspace().create_chat(a, &direct(b)).unwrap();
    env.workspace().send_message(chat.id, b, "saved?").unwrap();

    let reopened = env.config.open_database().unwrap();
    let messages = reopened.list_messages(chat.id).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "saved?");
}
