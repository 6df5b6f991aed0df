use super::audit::AuditInfo;
use serde::Serialize;

/// Resumption cursor of one upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncCheckpoint {
    pub source: String,
    pub value: String,
    pub audit: AuditInfo,
}

impl SyncCheckpoint {
    pub fn new(source: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            value: value.into(),
            audit: AuditInfo::default(),
        }
    }
}
