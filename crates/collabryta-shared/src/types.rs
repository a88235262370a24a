use serde::{Deserialize, Serialize};

/// Presence shown next to a conversation in the chat list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Offline,
    Group,
}

impl Presence {
    pub fn from_active(is_active: bool) -> Self {
        if is_active {
            Self::Online
        } else {
            Self::Offline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Group => "group",
        }
    }
}

impl std::fmt::Display for Presence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category tag carried by a notification.
///
/// The stored tag is free-form text; these are the tags the event triggers
/// produce. Unknown tags read back as [`NotificationKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
    Other(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Other(tag) => tag,
        }
    }
}

impl Default for NotificationKind {
    fn default() -> Self {
        Self::Info
    }
}

impl From<&str> for NotificationKind {
    fn from(tag: &str) -> Self {
        match tag {
            "info" => Self::Info,
            "success" => Self::Success,
            "warning" => Self::Warning,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for NotificationKind {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse file classification derived from the upload's extension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileKind {
    #[serde(rename = "PDF")]
    Pdf,
    Spreadsheet,
    Image,
    Video,
    Unknown,
}

impl FileKind {
    pub fn from_file_name(name: &str) -> Self {
        let ext = match name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return Self::Unknown,
        };
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "xlsx" | "xls" | "csv" => Self::Spreadsheet,
            "jpg" | "jpeg" | "png" | "svg" => Self::Image,
            "mp4" | "mov" => Self::Video,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Spreadsheet => "Spreadsheet",
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Unknown => "Unknown",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "PDF" => Self::Pdf,
            "Spreadsheet" => Self::Spreadsheet,
            "Image" => Self::Image,
            "Video" => Self::Video,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_extension() {
        assert_eq!(FileKind::from_file_name("report.PDF"), FileKind::Pdf);
        assert_eq!(FileKind::from_file_name("budget.csv"), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_file_name("logo.svg"), FileKind::Image);
        assert_eq!(FileKind::from_file_name("demo.mov"), FileKind::Video);
        assert_eq!(FileKind::from_file_name("notes.txt"), FileKind::Unknown);
        assert_eq!(FileKind::from_file_name("Makefile"), FileKind::Unknown);
    }

    #[test]
    fn test_notification_kind_tags() {
        assert_eq!(NotificationKind::from("success"), NotificationKind::Success);
        assert_eq!(
            NotificationKind::from("reminder"),
            NotificationKind::Other("reminder".to_string())
        );
        assert_eq!(NotificationKind::Other("reminder".into()).as_str(), "reminder");
    }

    #[test]
    fn test_presence_from_active() {
        assert_eq!(Presence::from_active(true).as_str(), "online");
        assert_eq!(Presence::from_active(false).as_str(), "offline");
    }
}
