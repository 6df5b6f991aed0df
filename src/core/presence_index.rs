use crate::models::{PresenceReading, PresenceStatus, ReferenceZone};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Presence readings bucketed by calendar date.
///
/// Order inside a bucket is the order the readings were given in; the first
/// match wins and nothing is deduplicated or merged.
#[derive(Debug, Clone, Default)]
pub struct PresenceIndex {
    by_date: HashMap<NaiveDate, Vec<PresenceReading>>,
}

impl PresenceIndex {
    pub fn build(readings: &[PresenceReading], zone: ReferenceZone) -> Self {
        let mut by_date: HashMap<NaiveDate, Vec<PresenceReading>> = HashMap::new();
        for r in readings {
            by_date
                .entry(zone.date_of(r.instant))
                .or_default()
                .push(r.clone());
        }
        Self { by_date }
    }

    pub fn readings_on(&self, date: NaiveDate) -> &[PresenceReading] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first_with_status(
        &self,
        date: NaiveDate,
        status: PresenceStatus,
    ) -> Option<&PresenceReading> {
        self.readings_on(date).iter().find(|r| r.status == status)
    }

    pub fn first_checked_in_on(&self, date: NaiveDate) -> Option<&PresenceReading> {
        self.first_with_status(date, PresenceStatus::CheckedIn)
    }

    pub fn first_checked_out_on(&self, date: NaiveDate) -> Option<&PresenceReading> {
        self.first_with_status(date, PresenceStatus::CheckedOut)
    }

    pub fn date_count(&self) -> usize {
        self.by_date.len()
    }
}
