use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which end of a stay an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckKind {
    In,
    Out,
}

/// Kind of evidence a check event was derived from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceSource {
    VehicleTrip,
    PresenceSensor,
    CalendarReservation,
}

impl EvidenceSource {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EvidenceSource::VehicleTrip => "VEHICLE_TRIP",
            EvidenceSource::PresenceSensor => "PRESENCE_SENSOR",
            EvidenceSource::CalendarReservation => "CALENDAR_RESERVATION",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "VEHICLE_TRIP" => Some(EvidenceSource::VehicleTrip),
            "PRESENCE_SENSOR" => Some(EvidenceSource::PresenceSensor),
            "CALENDAR_RESERVATION" => Some(EvidenceSource::CalendarReservation),
            _ => None,
        }
    }

    /// Short label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            EvidenceSource::VehicleTrip => "trip",
            EvidenceSource::PresenceSensor => "sensor",
            EvidenceSource::CalendarReservation => "calendar",
        }
    }
}

impl fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// Reconciled arrival or departure of a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckEvent {
    pub time: DateTime<Utc>,
    pub source: EvidenceSource,
    pub source_id: String,
}

impl CheckEvent {
    pub fn new(time: DateTime<Utc>, source: EvidenceSource, source_id: impl Into<String>) -> Self {
        Self {
            time,
            source,
            source_id: source_id.into(),
        }
    }
}
