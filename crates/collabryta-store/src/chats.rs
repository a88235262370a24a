//! Chat and participant queries.
//!
//! Participants are created together with their chat and never removed, so
//! membership checks made before a write stay valid for that write.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::database::{decode_ts, encode_ts, Database};
use crate::error::{Result, StoreError};
use crate::models::Chat;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Create a group chat with the given members (duplicates collapsed).
    pub fn create_group_chat(
        &self,
        name: Option<&str>,
        member_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<Chat> {
        let tx = self.immediate()?;
        let chat_id = insert_chat(&tx, name, true, member_ids, now)?;
        tx.commit()?;
        self.get_chat(chat_id)
    }

    /// Return the direct chat shared by `a` and `b`, creating it if needed.
    ///
    /// The lookup and the insert run in one immediate transaction, so two
    /// concurrent calls for the same pair end up with the same chat. The
    /// boolean is `true` when a new chat was created.
    pub fn get_or_create_direct_chat(
        &self,
        a: i64,
        b: i64,
        now: DateTime<Utc>,
    ) -> Result<(Chat, bool)> {
        if a == b {
            return Err(StoreError::DirectChatMembers);
        }
        let tx = self.immediate()?;
        let (chat_id, created) = match find_direct_chat(&tx, a, b)? {
            Some(existing) => (existing, false),
            None => (insert_chat(&tx, None, false, &[a, b], now)?, true),
        };
        tx.commit()?;
        Ok((self.get_chat(chat_id)?, created))
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_chat(&self, id: i64) -> Result<Chat> {
        let mut chat = self
            .conn()
            .query_row(
                "SELECT id, name, is_group, created_at FROM chats WHERE id = ?1",
                params![id],
                row_to_chat,
            )
            .map_err(StoreError::from_lookup)?;
        chat.participant_ids = self.list_participants(id)?;
        Ok(chat)
    }

    /// The direct chat shared by `a` and `b`, if any.
    pub fn find_direct_chat(&self, a: i64, b: i64) -> Result<Option<i64>> {
        find_direct_chat(self.conn(), a, b)
    }

    /// All chats `user_id` participates in, ordered by chat id.
    pub fn list_chats_for_user(&self, user_id: i64) -> Result<Vec<Chat>> {
        let mut stmt = self.conn().prepare(
            "SELECT c.id, c.name, c.is_group, c.created_at
             FROM chats c
             JOIN chat_participants p ON p.chat_id = c.id
             WHERE p.user_id = ?1
             ORDER BY c.id ASC",
        )?;

        let rows = stmt.query_map(params![user_id], row_to_chat)?;

        let mut chats = Vec::new();
        for row in rows {
            let mut chat = row?;
            chat.participant_ids = self.list_participants(chat.id)?;
            chats.push(chat);
        }
        Ok(chats)
    }

    /// Member user ids of a chat, ascending.
    pub fn list_participants(&self, chat_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self.conn().prepare(
            "SELECT user_id FROM chat_participants WHERE chat_id = ?1 ORDER BY user_id ASC",
        )?;
        let rows = stmt.query_map(params![chat_id], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    pub fn is_participant(&self, chat_id: i64, user_id: i64) -> Result<bool> {
        is_participant(self.conn(), chat_id, user_id)
    }

    /// The lowest-id member of `chat_id` other than `user_id`, if any.
    pub fn other_participant(&self, chat_id: i64, user_id: i64) -> Result<Option<i64>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT user_id FROM chat_participants
                 WHERE chat_id = ?1 AND user_id != ?2
                 ORDER BY user_id ASC LIMIT 1",
                params![chat_id, user_id],
                |row| row.get(0),
            )
            .optional()?)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn is_participant(conn: &Connection, chat_id: i64, user_id: i64) -> Result<bool> {
    Ok(conn
        .prepare_cached("SELECT 1 FROM chat_participants WHERE chat_id = ?1 AND user_id = ?2")?
        .exists(params![chat_id, user_id])?)
}

/// A non-group chat whose member set is exactly `{a, b}`.
fn find_direct_chat(conn: &Connection, a: i64, b: i64) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT c.id FROM chats c
             WHERE c.is_group = 0
               AND EXISTS (SELECT 1 FROM chat_participants p
                           WHERE p.chat_id = c.id AND p.user_id = ?1)
               AND EXISTS (SELECT 1 FROM chat_participants p
                           WHERE p.chat_id = c.id AND p.user_id = ?2)
               AND (SELECT COUNT(*) FROM chat_participants p
                    WHERE p.chat_id = c.id) = 2
             ORDER BY c.id ASC
             LIMIT 1",
            params![a, b],
            |row| row.get(0),
        )
        .optional()?)
}

fn insert_chat(
    conn: &Connection,
    name: Option<&str>,
    is_group: bool,
    member_ids: &[i64],
    now: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO chats (name, is_group, created_at) VALUES (?1, ?2, ?3)",
        params![name, is_group, encode_ts(&now)],
    )?;
    let chat_id = conn.last_insert_rowid();

    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO chat_participants (chat_id, user_id) VALUES (?1, ?2)",
    )?;
    for user_id in member_ids {
        stmt.execute(params![chat_id, user_id])?;
    }
    Ok(chat_id)
}

/// Map a `rusqlite::Row` to a [`Chat`] without participants.
fn row_to_chat(row: &rusqlite::Row<'_>) -> rusqlite::Result<Chat> {
    let created_str: String = row.get(3)?;
    Ok(Chat {
        id: row.get(0)?,
        name: row.get(1)?,
        is_group: row.get(2)?,
        created_at: decode_ts(3, &created_str)?,
        participant_ids: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{db, user};

    #[test]
    fn direct_chat_is_created_once() {
        let db = db();
        let ana = user(&db, "Ana");
        let ben = user(&db, "Ben");

        let (first, created) = db.get_or_create_direct_chat(ana.id, ben.id, Utc::now()).unwrap();
        assert!(created);
        assert_eq!(first.participant_ids, vec![ana.id, ben.id]);

        let (again, created) = db.get_or_create_direct_chat(ben.id, ana.id, Utc::now()).unwrap();
        assert!(!created);
        assert_eq!(again.id, first.id);
        assert_eq!(db.list_participants(first.id).unwrap().len(), 2);
    }

    #[test]
    fn group_membership_does_not_count_as_direct_chat() {
        let db = db();
        let ana = user(&db, "Ana");
        let ben = user(&db, "Ben");
        let cleo = user(&db, "Cleo");

        db.create_group_chat(Some("Team"), &[ana.id, ben.id, cleo.id], Utc::now())
            .unwrap();
        assert_eq!(db.find_direct_chat(ana.id, ben.id).unwrap(), None);
    }

    #[test]
    fn group_chat_collapses_duplicate_members() {
        let db = db();
        let ana = user(&db, "Ana");
        let ben = user(&db, "Ben");

        let chat = db
            .create_group_chat(None, &[ana.id, ben.id, ana.id], Utc::now())
            .unwrap();
        assert!(chat.is_group);
        assert_eq!(chat.participant_ids, vec![ana.id, ben.id]);
    }

    #[test]
    fn chats_for_user_and_other_participant() {
        let db = db();
        let ana = user(&db, "Ana");
        let ben = user(&db, "Ben");
        let cleo = user(&db, "Cleo");

        let (ab, _) = db.get_or_create_direct_chat(ana.id, ben.id, Utc::now()).unwrap();
        db.get_or_create_direct_chat(ben.id, cleo.id, Utc::now()).unwrap();

        let ana_chats = db.list_chats_for_user(ana.id).unwrap();
        assert_eq!(ana_chats.len(), 1);
        assert_eq!(ana_chats[0].id, ab.id);

        assert_eq!(db.other_participant(ab.id, ana.id).unwrap(), Some(ben.id));
        assert!(db.is_participant(ab.id, ben.id).unwrap());
        assert!(!db.is_participant(ab.id, cleo.id).unwrap());
    }

    #[test]
    fn direct_chat_with_oneself_is_refused() {
        let db = db();
        let ana = user(&db, "Ana");

        assert!(matches!(
            db.get_or_create_direct_chat(ana.id, ana.id, Utc::now()),
            Err(StoreError::DirectChatMembers)
        ));
        assert!(db.list_chats_for_user(ana.id).unwrap().is_empty());
    }

    #[test]
    fn every_direct_chat_has_two_members() {
        let db = db();
        let ana = user(&db, "Ana");
        let ben = user(&db, "Ben");
        let cleo = user(&db, "Cleo");

        for (a, b) in [(ana.id, ben.id), (ben.id, ana.id), (cleo.id, ana.id), (ana.id, cleo.id)] {
            db.get_or_create_direct_chat(a, b, Utc::now()).unwrap();
        }

        let chats = db.list_chats_for_user(ana.id).unwrap();
        assert_eq!(chats.len(), 2);
        assert!(chats
            .iter()
            .all(|c| !c.is_group && c.participant_ids.len() == 2));
    }

    #[test]
    fn missing_chat_is_not_found() {
        let db = db();
        assert!(matches!(db.get_chat(7), Err(StoreError::NotFound)));
    }
}
