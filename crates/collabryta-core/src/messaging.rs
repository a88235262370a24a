//! Chat creation, message delivery and read receipts.

use collabryta_shared::ValidationError;
use collabryta_store::{Chat, Database, Message};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::directory::Directory;
use crate::error::{CollabError, Result};
use crate::notifications::{Committed, Notifier};
use crate::triggers::EventTriggers;

/// Request to open a conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewChat {
    pub is_group: bool,
    pub name: Option<String>,
    pub participant_ids: Vec<i64>,
}

pub struct Messenger<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
    triggers: EventTriggers<'a>,
}

impl<'a> Messenger<'a> {
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

    /// Open a chat on behalf of `creator_id`.
    ///
    /// A group chat is always new and contains the creator plus every listed
    /// participant. A direct chat names exactly one other user; if the two
    /// already share one, that chat is returned unchanged.
    pub fn create_chat(&self, creator_id: i64, request: &NewChat) -> Result<Chat> {
        let mut members = request.participant_ids.clone();
        members.push(creator_id);
        members.sort_unstable();
        members.dedup();

        let known = self.db.existing_user_ids(&members)?;
        if let Some(missing) = members.iter().find(|id| !known.contains(id)) {
            return Err(CollabError::NotFound {
                entity: "user",
                id: *missing,
            });
        }

        if request.is_group {
            let name = request
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty());
            let chat = self.db.create_group_chat(name, &members, self.clock.now())?;
            info!(chat_id = chat.id, creator_id, members = members.len(), "group chat created");
            return Ok(chat);
        }

        let other_id = match request.participant_ids.as_slice() {
            [other] if *other != creator_id => *other,
            _ => return Err(ValidationError::DirectChatMembers.into()),
        };

        let (chat, created) =
            self.db
                .get_or_create_direct_chat(creator_id, other_id, self.clock.now())?;
        if created {
            info!(chat_id = chat.id, creator_id, other_id, "direct chat created");
        } else {
            debug!(chat_id = chat.id, creator_id, other_id, "direct chat already exists");
        }
        Ok(chat)
    }

    /// A chat with its participants, visible only to its members.
    pub fn get_chat(&self, chat_id: i64, user_id: i64) -> Result<Chat> {
        let chat = self
            .db
            .get_chat(chat_id)
            .map_err(CollabError::missing("chat", chat_id))?;
        if !chat.participant_ids.contains(&user_id) {
            return Err(CollabError::Membership { chat_id, user_id });
        }
        Ok(chat)
    }

    /// Append a message and notify the other participants.
    ///
    /// The message is committed before any notification is attempted;
    /// failed notifications are reported in the returned [`Committed`] and
    /// logged, never turned into an error.
    pub fn send_message(
        &self,
        chat_id: i64,
        sender_id: i64,
        text: &str,
    ) -> Result<Committed<Message>> {
        ValidationError::require("content", text)?;

        let participants = self
            .db
            .get_chat(chat_id)
            .map_err(CollabError::missing("chat", chat_id))?
            .participant_ids;

        let message = self
            .db
            .append_message(chat_id, sender_id, text, self.clock.now())?
            .ok_or(CollabError::Membership {
                chat_id,
                user_id: sender_id,
            })?;
        info!(message_id = message.id, chat_id, sender_id, "message sent");

        let fan_out = self.triggers.message_sent(&message, &participants);
        if !fan_out.is_complete() {
            warn!(
                message_id = message.id,
                failed = fan_out.failures.len(),
                "message stored with undelivered notifications"
            );
        }

        Ok(Committed {
            value: message,
            fan_out,
        })
    }

    /// Messages of a chat in conversation order, for members only.
    pub fn list_messages(&self, chat_id: i64, user_id: i64) -> Result<Vec<Message>> {
        self.get_chat(chat_id, user_id)?;
        Ok(self.db.list_messages(chat_id)?)
    }

    /// Mark everything other members sent in `chat_id` as read by `user_id`.
    ///
    /// Returns `false` without changing anything when `user_id` is not a
    /// participant. Repeating the call is harmless.
    pub fn mark_chat_read(&self, chat_id: i64, user_id: i64) -> Result<bool> {
        match self.db.mark_chat_read(chat_id, user_id)? {
            Some(flipped) => {
                debug!(chat_id, user_id, flipped, "chat marked read");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
