use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version counter and timestamps shared by every mutable entity.
///
/// Composed by value into `Reservation`, `PresenceReading` and
/// `SyncCheckpoint`. `updated_at` stays `None` until the first real change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AuditInfo {
    /// Audit block of a freshly inserted row.
    pub fn created(now: DateTime<Utc>) -> Self {
        Self {
            version: 1,
            created_at: now,
            updated_at: None,
        }
    }

    /// Record one applied change.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = Some(now);
    }

    /// Last time the row was written.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

impl Default for AuditInfo {
    /// Placeholder for records that have not been stored yet (version 0).
    fn default() -> Self {
        Self {
            version: 0,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: None,
        }
    }
}
