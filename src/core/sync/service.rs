//! A sync cycle followed by the reconciliation pass it feeds.

use super::feeds::{CalendarFileFeed, JsonFileFeed, SyncSource};
use super::orchestrator::{SyncOrchestrator, SyncReport};
use super::SourceKind;
use crate::config::Config;
use crate::core::reconcile::{ReconcileReport, run_pass};
use crate::errors::AppResult;
use crate::models::{PresenceReading, ReferenceZone, VehicleTrip};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub sync: SyncReport,
    /// Present when a reconciliation pass ran after the cycle.
    pub reconcile: Option<ReconcileReport>,
}

#[derive(Debug, Clone, Copy)]
pub struct SyncService {
    zone: ReferenceZone,
    reconcile_every_cycle: bool,
}

impl SyncService {
    pub fn new(zone: ReferenceZone, reconcile_every_cycle: bool) -> Self {
        Self {
            zone,
            reconcile_every_cycle,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.zone(), cfg.reconcile_every_cycle)
    }

    pub fn zone(&self) -> ReferenceZone {
        self.zone
    }

    /// One orchestrator cycle, then a reconciliation pass unless the
    /// service only reconciles after changes and nothing changed.
    pub fn run_source<S: SyncSource>(
        &self,
        conn: &mut Connection,
        orchestrator: &mut SyncOrchestrator<S>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> AppResult<CycleReport> {
        let sync = orchestrator.run_cycle(conn, now)?;

        let reconcile = if self.reconcile_every_cycle || sync.changed() {
            Some(run_pass(conn, self.zone, today, now)?)
        } else {
            None
        };

        Ok(CycleReport { sync, reconcile })
    }

    /// Same as [`run_source`](Self::run_source) for one of the JSON file feeds.
    pub fn run_file_source(
        &self,
        conn: &mut Connection,
        kind: SourceKind,
        path: &Path,
        epoch: Option<String>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> AppResult<CycleReport> {
        match kind {
            SourceKind::Calendar => {
                let feed = CalendarFileFeed::new(kind.key(), path);
                let mut orch = SyncOrchestrator::new(feed).with_epoch(epoch);
                self.run_source(conn, &mut orch, today, now)
            }
            SourceKind::Trips => {
                let feed = JsonFileFeed::<VehicleTrip>::new(kind.key(), path);
                let mut orch = SyncOrchestrator::new(feed).with_epoch(epoch);
                self.run_source(conn, &mut orch, today, now)
            }
            SourceKind::Presence => {
                let feed = JsonFileFeed::<PresenceReading>::new(kind.key(), path);
                let mut orch = SyncOrchestrator::new(feed).with_epoch(epoch);
                self.run_source(conn, &mut orch, today, now)
            }
        }
    }
}
