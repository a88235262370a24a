//! Conversation list aggregation.
//!
//! Summaries are derived on every call from the chat, participant and
//! message tables; nothing is cached.

use chrono::{DateTime, Utc};
use collabryta_shared::constants::{GROUP_CHAT_FALLBACK_NAME, SELF_CHAT_NAME, UNKNOWN_USER_NAME};
use collabryta_shared::Presence;
use collabryta_store::{Chat, Database};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directory::Directory;
use crate::error::Result;

/// One row of a user's conversation list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: i64,
    pub is_group: bool,
    pub name: String,
    pub status: Presence,
    /// The peer of a direct chat; `None` for groups and unknown peers.
    pub other_user_id: Option<i64>,
    pub last_message: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
    pub unread_count: u64,
}

pub struct ConversationAggregator<'a> {
    db: &'a Database,
    directory: &'a dyn Directory,
}

impl<'a> ConversationAggregator<'a> {
    pub fn new(db: &'a Database, directory: &'a dyn Directory) -> Self {
        Self { db, directory }
    }

    /// Every chat `user_id` participates in, most recently active first.
    ///
    /// Chats without messages sort last; ties are broken by chat id.
    pub fn list(&self, user_id: i64) -> Result<Vec<ConversationSummary>> {
        let chats = self.db.list_chats_for_user(user_id)?;

        let mut summaries = Vec::with_capacity(chats.len());
        for chat in &chats {
            summaries.push(self.summarize(chat, user_id)?);
        }

        summaries.sort_by(|a, b| {
            b.last_message_time
                .cmp(&a.last_message_time)
                .then_with(|| a.id.cmp(&b.id))
        });

        debug!(user_id, conversations = summaries.len(), "aggregated conversations");
        Ok(summaries)
    }

    fn summarize(&self, chat: &Chat, user_id: i64) -> Result<ConversationSummary> {
        let last = self.db.latest_message(chat.id)?;
        let unread_count = self.db.count_unread_messages(chat.id, user_id)?;
        let (name, status, other_user_id) = self.display_fields(chat, user_id)?;

        Ok(ConversationSummary {
            id: chat.id,
            is_group: chat.is_group,
            name,
            status,
            other_user_id,
            last_message_time: last.as_ref().map(|m| m.timestamp),
            last_message: last.map(|m| m.content),
            unread_count,
        })
    }

    fn display_fields(
        &self,
        chat: &Chat,
        user_id: i64,
    ) -> Result<(String, Presence, Option<i64>)> {
        if chat.is_group {
            let name = chat
                .name
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(GROUP_CHAT_FALLBACK_NAME);
            return Ok((name.to_string(), Presence::Group, None));
        }

        let Some(peer_id) = self.db.other_participant(chat.id, user_id)? else {
            return Ok((SELF_CHAT_NAME.to_string(), Presence::Online, Some(user_id)));
        };

        Ok(match self.directory.lookup(peer_id)? {
            Some(peer) => (
                peer.display_name().unwrap_or(UNKNOWN_USER_NAME).to_string(),
                Presence::from_active(peer.is_active),
                Some(peer.id),
            ),
            None => (UNKNOWN_USER_NAME.to_string(), Presence::Offline, None),
        })
    }
}
