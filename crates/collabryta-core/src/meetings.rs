//! Meeting scheduling. A new meeting confirms to its host and invites its
//! participants.

use chrono::{DateTime, Duration, Utc};
use collabryta_shared::constants::RECENT_MEETING_HOURS;
use collabryta_shared::ValidationError;
use collabryta_store::{Database, Meeting, MeetingRow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::directory::Directory;
use crate::error::{CollabError, Result};
use crate::notifications::{Committed, Notifier};
use crate::triggers::EventTriggers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMeeting {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    /// Ids that do not name an existing user are dropped.
    #[serde(default)]
    pub participant_ids: Vec<i64>,
}

pub struct MeetingService<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
    triggers: EventTriggers<'a>,
    recent: Duration,
}

impl<'a> MeetingService<'a> {
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
            recent: Duration::hours(RECENT_MEETING_HOURS),
        }
    }

    /// Override how far back `list_for_user(.., true)` looks.
    pub fn with_recent_window(mut self, recent: Duration) -> Self {
        self.recent = recent;
        self
    }

    pub fn create(&self, host_id: i64, meeting: &NewMeeting) -> Result<Committed<Meeting>> {
        ValidationError::require("title", &meeting.title)?;
        if meeting.end_time < meeting.start_time {
            return Err(ValidationError::InvertedTimeRange.into());
        }
        if self.db.find_user(host_id)?.is_none() {
            return Err(CollabError::NotFound {
                entity: "user",
                id: host_id,
            });
        }

        let participant_ids = self.db.existing_user_ids(&meeting.participant_ids)?;
        let dropped = meeting.participant_ids.len() - participant_ids.len();
        if dropped > 0 {
            debug!(host_id, dropped, "ignored unknown or repeated meeting participants");
        }

        let stored = self.db.insert_meeting(&MeetingRow {
            title: meeting.title.trim().to_string(),
            description: meeting.description.clone(),
            start_time: meeting.start_time,
            end_time: meeting.end_time,
            location: meeting.location.clone(),
            meeting_link: meeting.meeting_link.clone(),
            host_id,
            participant_ids,
        })?;
        info!(
            meeting_id = stored.id,
            host_id,
            participants = stored.participant_ids.len(),
            "meeting created"
        );

        let fan_out = self.triggers.meeting_created(&stored);
        Ok(Committed {
            value: stored,
            fan_out,
        })
    }

    pub fn get(&self, meeting_id: i64) -> Result<Meeting> {
        self.db
            .get_meeting(meeting_id)
            .map_err(CollabError::missing("meeting", meeting_id))
    }

    /// Meetings hosted by or involving `user_id`, by start time. With
    /// `recent_only`, meetings that ended before the recent window are left
    /// out.
    pub fn list_for_user(&self, user_id: i64, recent_only: bool) -> Result<Vec<Meeting>> {
        let ended_after = recent_only.then(|| {
            self.clock
                .now()
                .checked_sub_signed(self.recent)
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        });
        Ok(self.db.list_meetings_for_user(user_id, ended_after)?)
    }

    /// Cancel a meeting. Only the host may do this.
    pub fn delete(&self, actor_id: i64, meeting_id: i64) -> Result<Meeting> {
        let meeting = self.get(meeting_id)?;
        if meeting.host_id != actor_id {
            return Err(CollabError::denied(format!(
                "only the host can delete meeting {meeting_id}"
            )));
        }
        self.db.delete_meeting(meeting_id)?;
        info!(meeting_id, actor_id, "meeting deleted");
        Ok(meeting)
    }
}
