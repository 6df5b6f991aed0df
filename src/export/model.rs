// src/export/model.rs

use crate::models::{CheckEvent, ReferenceZone, Reservation};
use crate::utils::format_duration;
use serde::Serialize;

/// Flat reservation row shared by the CSV and JSON exporters.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ReservationExport {
    pub id: String,
    pub start: String,
    pub end: String,
    pub guests: String,
    pub summary: String,
    pub check_in: String,
    pub check_in_source: String,
    pub check_out: String,
    pub check_out_source: String,
    pub stay: String,
    pub version: i64,
}

fn event_fields(event: Option<&CheckEvent>, zone: ReferenceZone) -> (String, String) {
    match event {
        Some(e) => (
            e.time.with_timezone(&zone.offset()).to_rfc3339(),
            e.source.to_db_str().to_string(),
        ),
        None => (String::new(), String::new()),
    }
}

impl ReservationExport {
    pub fn from_reservation(r: &Reservation, zone: ReferenceZone) -> Self {
        let (check_in, check_in_source) = event_fields(r.check_in.as_ref(), zone);
        let (check_out, check_out_source) = event_fields(r.check_out.as_ref(), zone);

        let stay = r.duration().map(format_duration).unwrap_or_default();

        Self {
            id: r.id.clone(),
            start: r.start.with_timezone(&zone.offset()).to_rfc3339(),
            end: r.end.with_timezone(&zone.offset()).to_rfc3339(),
            guests: r.guest_ids.join(";"),
            summary: r.summary.clone(),
            check_in,
            check_in_source,
            check_out,
            check_out_source,
            stay,
            version: r.audit.version,
        }
    }
}
