use super::audit::AuditInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PresenceStatus {
    CheckedIn,
    CheckedOut,
}

impl PresenceStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PresenceStatus::CheckedIn => "CHECKED_IN",
            PresenceStatus::CheckedOut => "CHECKED_OUT",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "CHECKED_IN" => Some(PresenceStatus::CheckedIn),
            "CHECKED_OUT" => Some(PresenceStatus::CheckedOut),
            _ => None,
        }
    }
}

/// A single presence sensor event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceReading {
    pub id: String,
    pub instant: DateTime<Utc>,
    pub status: PresenceStatus,
    #[serde(default, skip_serializing)]
    pub audit: AuditInfo,
}

impl PresenceReading {
    pub fn new(id: impl Into<String>, instant: DateTime<Utc>, status: PresenceStatus) -> Self {
        Self {
            id: id.into(),
            instant,
            status,
            audit: AuditInfo::default(),
        }
    }
}
