/// Hours a notification stays visible after it was created
pub const NOTIFICATION_WINDOW_HOURS: i64 = 24;

/// Trailing window (hours, on `end_time`) for the "recent meetings" listing
pub const RECENT_MEETING_HOURS: i64 = 48;

/// Default page size for notification listings
pub const DEFAULT_NOTIFICATION_LIMIT: u32 = 100;

/// Characters of message text kept in a notification preview
pub const MESSAGE_PREVIEW_CHARS: usize = 50;

/// Appended to a preview when the message text was cut
pub const PREVIEW_ELLIPSIS: &str = "...";

/// Display fallbacks used by the conversation list
pub const GROUP_CHAT_FALLBACK_NAME: &str = "Group Chat";
pub const SELF_CHAT_NAME: &str = "Me";
pub const UNKNOWN_USER_NAME: &str = "Unknown";

/// Display fallbacks used when composing notifications
pub const UNKNOWN_SENDER_NAME: &str = "Someone";
pub const UNKNOWN_HOST_NAME: &str = "Host";

/// Task defaults
pub const DEFAULT_TASK_STATUS: &str = "Pending";
pub const DEFAULT_TASK_PRIORITY: &str = "Medium";

/// Default role / presence text for newly created users
pub const DEFAULT_USER_ROLE: &str = "Team Member";
pub const DEFAULT_USER_STATUS: &str = "Offline";
