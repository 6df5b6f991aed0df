use super::location::LocationClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One GPS-derived vehicle trip. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleTrip {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub start_location: LocationClass,
    pub end_location: LocationClass,
    #[serde(default, skip_serializing)]
    pub ingested_at: Option<DateTime<Utc>>,
}

impl VehicleTrip {
    pub fn new(
        id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        start_location: LocationClass,
        end_location: LocationClass,
    ) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            start_location,
            end_location,
            ingested_at: None,
        }
    }

    /// Starts away from the cabin and ends there.
    pub fn is_arriving(&self) -> bool {
        !self.start_location.is_cabin() && self.end_location.is_cabin()
    }

    /// Both endpoints near the cabin.
    pub fn is_at_cabin(&self) -> bool {
        self.start_location.is_cabin() && self.end_location.is_cabin()
    }

    /// Neither endpoint at the cabin.
    pub fn is_away(&self) -> bool {
        !self.start_location.is_cabin() && !self.end_location.is_cabin()
    }
}
