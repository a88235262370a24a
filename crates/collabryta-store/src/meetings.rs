use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::database::{decode_ts, encode_ts, Database};
use crate::error::{Result, StoreError};
use crate::models::{Meeting, MeetingRow};

const MEETING_COLUMNS: &str =
    "m.id, m.title, m.description, m.start_time, m.end_time, m.location, m.meeting_link, m.host_id";

impl Database {
    /// Insert a meeting and its participant rows atomically.
    pub fn insert_meeting(&self, meeting: &MeetingRow) -> Result<Meeting> {
        let tx = self.immediate()?;
        tx.execute(
            "INSERT INTO meetings (title, description, start_time, end_time, location,
                                   meeting_link, host_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                meeting.title,
                meeting.description,
                encode_ts(&meeting.start_time),
                encode_ts(&meeting.end_time),
                meeting.location,
                meeting.meeting_link,
                meeting.host_id,
            ],
        )?;
        let meeting_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO meeting_participants (meeting_id, user_id)
                 VALUES (?1, ?2)",
            )?;
            for user_id in &meeting.participant_ids {
                stmt.execute(params![meeting_id, user_id])?;
            }
        }

        tx.commit()?;
        self.get_meeting(meeting_id)
    }

    pub fn get_meeting(&self, id: i64) -> Result<Meeting> {
        let mut meeting = self
            .conn()
            .query_row(
                &format!("SELECT {MEETING_COLUMNS} FROM meetings m WHERE m.id = ?1"),
                params![id],
                row_to_meeting,
            )
            .map_err(StoreError::from_lookup)?;
        meeting.participant_ids = self.list_meeting_participants(id)?;
        Ok(meeting)
    }

    pub fn list_meeting_participants(&self, meeting_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self.conn().prepare(
            "SELECT user_id FROM meeting_participants
             WHERE meeting_id = ?1 ORDER BY user_id ASC",
        )?;
        let rows = stmt.query_map(params![meeting_id], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// Meetings hosted by or involving `user_id`, ordered by start time.
    ///
    /// With `ended_after`, only meetings whose `end_time` is at or after that
    /// instant are returned.
    pub fn list_meetings_for_user(
        &self,
        user_id: i64,
        ended_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Meeting>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings m
             WHERE (m.host_id = ?1
                    OR EXISTS (SELECT 1 FROM meeting_participants p
                               WHERE p.meeting_id = m.id AND p.user_id = ?1))
               AND (?2 IS NULL OR m.end_time >= ?2)
             ORDER BY m.start_time ASC, m.id ASC"
        ))?;

        let rows = stmt.query_map(
            params![user_id, ended_after.as_ref().map(encode_ts)],
            row_to_meeting,
        )?;

        let mut meetings = Vec::new();
        for row in rows {
            let mut meeting = row?;
            meeting.participant_ids = self.list_meeting_participants(meeting.id)?;
            meetings.push(meeting);
        }
        Ok(meetings)
    }

    pub fn delete_meeting(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM meetings WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

fn row_to_meeting(row: &rusqlite::Row<'_>) -> rusqlite::Result<Meeting> {
    let start_str: String = row.get(3)?;
    let end_str: String = row.get(4)?;

    Ok(Meeting {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        start_time: decode_ts(3, &start_str)?,
        end_time: decode_ts(4, &end_str)?,
        location: row.get(5)?,
        meeting_link: row.get(6)?,
        host_id: row.get(7)?,
        participant_ids: Vec::new(),
    })
}
