//! Reconciliation of reservations against trip and presence evidence.

use crate::core::evidence::{CalendarEvidence, EvidenceProvider, PresenceEvidence, VehicleTripEvidence};
use crate::core::presence_index::PresenceIndex;
use crate::core::segmenter::{CabinVisitTripGroup, segment};
use crate::db::log::ttlog_quiet;
use crate::db::upsert::UpsertOutcome;
use crate::db::{presence, reservations, trips};
use crate::errors::AppResult;
use crate::models::{
    CheckEvent, CheckKind, EvidenceSource, PresenceReading, ReferenceZone, Reservation, VehicleTrip,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use std::collections::HashMap;
use tracing::{error, info};

/// Ordered chain of evidence providers. The first provider with an answer wins.
pub struct ReconciliationEngine<'a> {
    providers: Vec<Box<dyn EvidenceProvider + 'a>>,
    zone: ReferenceZone,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(providers: Vec<Box<dyn EvidenceProvider + 'a>>, zone: ReferenceZone) -> Self {
        Self { providers, zone }
    }

    /// Vehicle trips, then presence sensor, then the calendar itself.
    pub fn standard(
        groups: &'a [CabinVisitTripGroup],
        index: &'a PresenceIndex,
        zone: ReferenceZone,
    ) -> Self {
        Self::new(
            vec![
                Box::new(VehicleTripEvidence::new(groups, zone)),
                Box::new(PresenceEvidence::new(index, zone)),
                Box::new(CalendarEvidence),
            ],
            zone,
        )
    }

    pub fn derive(&self, reservation: &Reservation, kind: CheckKind) -> Option<CheckEvent> {
        self.providers
            .iter()
            .find_map(|p| p.evidence(reservation, kind))
    }

    /// Events for one reservation as of `today`: check-in once started,
    /// check-out once ended.
    pub fn check_events(
        &self,
        reservation: &Reservation,
        today: NaiveDate,
    ) -> (Option<CheckEvent>, Option<CheckEvent>) {
        let check_in = if reservation.has_started(today, self.zone) {
            self.derive(reservation, CheckKind::In)
        } else {
            None
        };
        let check_out = if reservation.has_ended(today, self.zone) {
            self.derive(reservation, CheckKind::Out)
        } else {
            None
        };
        (check_in, check_out)
    }

    /// Copy of `reservation` with freshly derived events; previous ones are discarded.
    pub fn annotate(&self, reservation: &Reservation, today: NaiveDate) -> Reservation {
        let (check_in, check_out) = self.check_events(reservation, today);
        let mut out = reservation.clone();
        out.check_in = check_in;
        out.check_out = check_out;
        out
    }
}

/// Annotate every reservation with its check-in / check-out. Pure.
pub fn reconcile(
    reservations: &[Reservation],
    trips: &[VehicleTrip],
    readings: &[PresenceReading],
    today: NaiveDate,
    zone: ReferenceZone,
) -> Vec<Reservation> {
    let groups = segment(trips, zone);
    let index = PresenceIndex::build(readings, zone);
    let engine = ReconciliationEngine::standard(&groups, &index, zone);

    reservations
        .iter()
        .map(|r| engine.annotate(r, today))
        .collect()
}

/// Outcome of a reconciliation pass over the store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub total: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub missing: usize,
    pub failed: Vec<(String, String)>,
    pub check_in_sources: HashMap<EvidenceSource, usize>,
    pub check_out_sources: HashMap<EvidenceSource, usize>,
}

impl ReconcileReport {
    fn record(&mut self, r: &Reservation, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Updated { .. } | UpsertOutcome::Inserted => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
            UpsertOutcome::Missing => {
                self.missing += 1;
                return;
            }
        }
        if let Some(ci) = &r.check_in {
            *self.check_in_sources.entry(ci.source).or_default() += 1;
        }
        if let Some(co) = &r.check_out {
            *self.check_out_sources.entry(co.source).or_default() += 1;
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} reservations: {} updated, {} unchanged, {} missing, {} failed",
            self.total,
            self.updated,
            self.unchanged,
            self.missing,
            self.failed.len()
        )
    }
}

/// Recompute and store check events for every stored reservation.
///
/// Each reservation is written in its own transaction; a failure is logged
/// and counted, and the pass moves on.
pub fn run_pass(
    conn: &mut Connection,
    zone: ReferenceZone,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> AppResult<ReconcileReport> {
    let (stored, unreadable) = reservations::load_all_lenient(conn)?;
    let all_trips = trips::load_all(conn)?;
    let readings = presence::load_all(conn)?;

    let annotated = reconcile(&stored, &all_trips, &readings, today, zone);

    let mut report = ReconcileReport {
        total: annotated.len() + unreadable.len(),
        ..Default::default()
    };

    for (id, e) in unreadable {
        error!(reservation = %id, error = %e, "unreadable reservation, skipping");
        report.failed.push((id, e.to_string()));
    }

    for r in &annotated {
        match reservations::store_check_events(
            conn,
            &r.id,
            r.check_in.clone(),
            r.check_out.clone(),
            now,
        ) {
            Ok(outcome) => report.record(r, outcome),
            Err(e) => {
                error!(reservation = %r.id, error = %e, "reconciliation failed, skipping");
                report.failed.push((r.id.clone(), e.to_string()));
            }
        }
    }

    info!(
        total = report.total,
        updated = report.updated,
        unchanged = report.unchanged,
        missing = report.missing,
        failed = report.failed.len(),
        "reconciliation pass finished"
    );

    if report.updated > 0 || !report.failed.is_empty() {
        ttlog_quiet(conn, "reconcile", "", &report.summary());
    }

    Ok(report)
}
