use super::audit::AuditInfo;
use super::check_event::{CheckEvent, CheckKind};
use super::zone::ReferenceZone;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A calendar-declared stay at the cabin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub guest_ids: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub check_in: Option<CheckEvent>,
    #[serde(default)]
    pub check_out: Option<CheckEvent>,

    #[serde(default, skip_serializing)]
    pub audit: AuditInfo,
}

impl Reservation {
    pub fn new(
        id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        summary: impl Into<String>,
    ) -> AppResult<Self> {
        let r = Self {
            id: id.into(),
            start,
            end,
            guest_ids: Vec::new(),
            summary: summary.into(),
            description: None,
            source_created_at: None,
            source_updated_at: None,
            check_in: None,
            check_out: None,
            audit: AuditInfo::default(),
        };
        r.validate()?;
        Ok(r)
    }

    /// start ≤ end
    pub fn validate(&self) -> AppResult<()> {
        if self.start > self.end {
            return Err(AppError::InvertedReservation {
                id: self.id.clone(),
            });
        }
        Ok(())
    }

    pub fn start_date(&self, zone: ReferenceZone) -> NaiveDate {
        zone.date_of(self.start)
    }

    pub fn end_date(&self, zone: ReferenceZone) -> NaiveDate {
        zone.date_of(self.end)
    }

    /// Date that anchors the evidence lookup for `kind`.
    pub fn anchor_date(&self, kind: CheckKind, zone: ReferenceZone) -> NaiveDate {
        match kind {
            CheckKind::In => self.start_date(zone),
            CheckKind::Out => self.end_date(zone),
        }
    }

    /// Nominal calendar bound for `kind`.
    pub fn bound(&self, kind: CheckKind) -> DateTime<Utc> {
        match kind {
            CheckKind::In => self.start,
            CheckKind::Out => self.end,
        }
    }

    pub fn has_started(&self, today: NaiveDate, zone: ReferenceZone) -> bool {
        self.start_date(zone) <= today
    }

    pub fn has_ended(&self, today: NaiveDate, zone: ReferenceZone) -> bool {
        self.end_date(zone) <= today
    }

    /// Time between check-in and check-out; absent unless both are known.
    pub fn duration(&self) -> Option<Duration> {
        match (&self.check_in, &self.check_out) {
            (Some(i), Some(o)) => Some(o.time - i.time),
            _ => None,
        }
    }

    /// Copy the calendar-owned fields from `other`. Returns true if anything changed.
    pub fn merge_calendar_fields(&mut self, other: &Reservation) -> bool {
        let changed = self.start != other.start
            || self.end != other.end
            || self.guest_ids != other.guest_ids
            || self.summary != other.summary
            || self.description != other.description
            || self.source_created_at != other.source_created_at
            || self.source_updated_at != other.source_updated_at;

        if changed {
            self.start = other.start;
            self.end = other.end;
            self.guest_ids = other.guest_ids.clone();
            self.summary = other.summary.clone();
            self.description = other.description.clone();
            self.source_created_at = other.source_created_at;
            self.source_updated_at = other.source_updated_at;
        }
        changed
    }

    /// Replace the reconciled events. Returns true if anything changed.
    pub fn set_check_events(
        &mut self,
        check_in: Option<CheckEvent>,
        check_out: Option<CheckEvent>,
    ) -> bool {
        if self.check_in == check_in && self.check_out == check_out {
            return false;
        }
        self.check_in = check_in;
        self.check_out = check_out;
        true
    }
}
