use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{params, OptionalExtension};

use crate::chats::is_participant;
use crate::database::{decode_ts, encode_ts, Database};
use crate::error::{Result, StoreError};
use crate::models::Message;

const MESSAGE_COLUMNS: &str = "id, chat_id, sender_id, content, timestamp, is_read";

impl Database {
    /// Append a message to a chat on behalf of one of its members.
    ///
    /// Returns `Ok(None)` without writing anything when `sender_id` is not a
    /// participant of `chat_id`. The stored timestamp is `now`, raised to the
    /// chat's latest message timestamp if the clock went backwards, so
    /// timestamps never decrease within a chat. Equal timestamps are ordered
    /// by id.
    pub fn append_message(
        &self,
        chat_id: i64,
        sender_id: i64,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Message>> {
        let tx = self.immediate()?;
        if !is_participant(&tx, chat_id, sender_id)? {
            return Ok(None);
        }

        let latest: Option<String> = tx
            .query_row(
                "SELECT MAX(timestamp) FROM messages WHERE chat_id = ?1",
                params![chat_id],
                |row| row.get(0),
            )?;
        // Stored precision is microseconds.
        let now = now.trunc_subsecs(6);
        let timestamp = match latest {
            Some(raw) => now.max(decode_ts(0, &raw)?),
            None => now,
        };

        tx.execute(
            "INSERT INTO messages (chat_id, sender_id, content, timestamp, is_read)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![chat_id, sender_id, content, encode_ts(&timestamp)],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Some(Message {
            id,
            chat_id,
            sender_id,
            content: content.to_string(),
            timestamp,
            is_read: false,
        }))
    }

    pub fn get_message(&self, id: i64) -> Result<Message> {
        self.conn()
            .query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![id],
                row_to_message,
            )
            .map_err(StoreError::from_lookup)
    }

    /// Every message of a chat in conversation order: timestamp ascending,
    /// then id ascending.
    pub fn list_messages(&self, chat_id: i64) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE chat_id = ?1
             ORDER BY timestamp ASC, id ASC"
        ))?;

        let rows = stmt.query_map(params![chat_id], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// The most recent message of a chat, if it has any.
    pub fn latest_message(&self, chat_id: i64) -> Result<Option<Message>> {
        Ok(self
            .conn()
            .query_row(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE chat_id = ?1
                     ORDER BY timestamp DESC, id DESC
                     LIMIT 1"
                ),
                params![chat_id],
                row_to_message,
            )
            .optional()?)
    }

    /// Messages in `chat_id` sent by someone other than `user_id` and not yet
    /// read.
    pub fn count_unread_messages(&self, chat_id: i64, user_id: i64) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM messages
             WHERE chat_id = ?1 AND sender_id != ?2 AND is_read = 0",
            params![chat_id, user_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Flip every unread message in `chat_id` not authored by `reader_id` to
    /// read. Returns the number of messages flipped, or `None` (and changes
    /// nothing) when `reader_id` is not a participant.
    pub fn mark_chat_read(&self, chat_id: i64, reader_id: i64) -> Result<Option<usize>> {
        let tx = self.immediate()?;
        if !is_participant(&tx, chat_id, reader_id)? {
            return Ok(None);
        }
        let flipped = tx.execute(
            "UPDATE messages SET is_read = 1
             WHERE chat_id = ?1 AND sender_id != ?2 AND is_read = 0",
            params![chat_id, reader_id],
        )?;
        tx.commit()?;
        Ok(Some(flipped))
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let ts_str: String = row.get(4)?;

    Ok(Message {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        sender_id: row.get(2)?,
        content: row.get(3)?,
        timestamp: decode_ts(4, &ts_str)?,
        is_read: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{db, user};
    use chrono::Duration;

    #[test]
    fn timestamps_never_go_backwards() {
        let db = db();
        let ana = user(&db, "Ana");
        let ben = user(&db, "Ben");
        let (chat, _) = db.get_or_create_direct_chat(ana.id, ben.id, Utc::now()).unwrap();

        let now = Utc::now();
        let first = db.append_message(chat.id, ana.id, "first", now).unwrap().unwrap();
        let second = db
            .append_message(chat.id, ben.id, "second", now - Duration::minutes(5))
            .unwrap()
            .unwrap();

        assert_eq!(second.timestamp, first.timestamp);
        let listed: Vec<_> = db
            .list_messages(chat.id)
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(listed, vec!["first", "second"]);
        assert_eq!(db.latest_message(chat.id).unwrap().unwrap().id, second.id);
    }

    #[test]
    fn unread_counts_ignore_own_messages() {
        let db = db();
        let ana = user(&db, "Ana");
        let ben = user(&db, "Ben");
        let (chat, _) = db.get_or_create_direct_chat(ana.id, ben.id, Utc::now()).unwrap();

        db.append_message(chat.id, ana.id, "hi", Utc::now()).unwrap();
        db.append_message(chat.id, ana.id, "there", Utc::now()).unwrap();
        db.append_message(chat.id, ben.id, "hey", Utc::now()).unwrap();

        assert_eq!(db.count_unread_messages(chat.id, ben.id).unwrap(), 2);
        assert_eq!(db.count_unread_messages(chat.id, ana.id).unwrap(), 1);

        assert_eq!(db.mark_chat_read(chat.id, ben.id).unwrap(), Some(2));
        assert_eq!(db.mark_chat_read(chat.id, ben.id).unwrap(), Some(0));
        assert_eq!(db.count_unread_messages(chat.id, ben.id).unwrap(), 0);
        assert_eq!(db.count_unread_messages(chat.id, ana.id).unwrap(), 1);
    }

    #[test]
    fn non_members_cannot_write() {
        let db = db();
        let ana = user(&db, "Ana");
        let ben = user(&db, "Ben");
        let eve = user(&db, "Eve");
        let (chat, _) = db.get_or_create_direct_chat(ana.id, ben.id, Utc::now()).unwrap();
        db.append_message(chat.id, ana.id, "hi", Utc::now()).unwrap();

        assert_eq!(db.append_message(chat.id, eve.id, "psst", Utc::now()).unwrap(), None);
        assert_eq!(db.mark_chat_read(chat.id, eve.id).unwrap(), None);
        assert_eq!(db.list_messages(chat.id).unwrap().len(), 1);
        assert_eq!(db.count_unread_messages(chat.id, ben.id).unwrap(), 1);
    }

    #[test]
    fn empty_chat_has_no_latest_message() {
        let db = db();
        let ana = user(&db, "Ana");
        let chat = db.create_group_chat(Some("Solo"), &[ana.id], Utc::now()).unwrap();
        assert_eq!(db.latest_message(chat.id).unwrap(), None);
        assert!(matches!(db.get_message(1), Err(StoreError::NotFound)));
    }
}
