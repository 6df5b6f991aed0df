//! Formatting utilities used for CLI and export outputs.

use crate::models::EvidenceSource;
use crate::utils::colors::{BLUE, CYAN, MAGENTA};

/// Short label and ANSI color for an evidence source.
pub fn describe_source(source: EvidenceSource) -> (&'static str, &'static str) {
    let color = match source {
        EvidenceSource::VehicleTrip => BLUE,
        EvidenceSource::PresenceSensor => CYAN,
        EvidenceSource::CalendarReservation => MAGENTA,
    };
    (source.label(), color)
}
