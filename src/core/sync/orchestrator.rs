//! One checkpointed fetch-and-store cycle for a single upstream feed.

use super::feeds::{FeedBatch, FetchError, SyncCursor, SyncSource};
use super::records::SyncRecord;
use crate::db::checkpoints;
use crate::db::log::ttlog_quiet;
use crate::db::upsert::UpsertOutcome;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info, warn};

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub source: String,
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub missing: usize,
    /// The cycle ran without a checkpoint (first run or after a reset).
    pub full_resync: bool,
    /// Checkpoint stored at the end of the cycle.
    pub checkpoint: Option<String>,
}

impl SyncReport {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated { .. } => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
            UpsertOutcome::Missing => self.missing += 1,
        }
    }

    /// Whether the cycle wrote any record.
    pub fn changed(&self) -> bool {
        self.inserted + self.updated > 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} fetched, {} inserted, {} updated, {} unchanged{}",
            self.source,
            self.fetched,
            self.inserted,
            self.updated,
            self.unchanged,
            if self.full_resync { " (full)" } else { "" }
        )
    }
}

pub struct SyncOrchestrator<S> {
    source: S,
    epoch: Option<String>,
}

impl<S: SyncSource> SyncOrchestrator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            epoch: None,
        }
    }

    /// Lower bound used for a full sync.
    pub fn with_epoch(mut self, epoch: Option<String>) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn source_key(&self) -> &str {
        self.source.source_key()
    }

    fn full_cursor(&self) -> SyncCursor {
        SyncCursor::Full {
            epoch: self.epoch.clone(),
        }
    }

    fn upstream_error(&self, message: String) -> AppError {
        AppError::Upstream {
            source_key: self.source.source_key().to_string(),
            message,
        }
    }

    /// Fetch with the stored checkpoint, falling back once to a full sync
    /// when the upstream rejects it.
    fn fetch(
        &mut self,
        conn: &Connection,
        stored: Option<String>,
    ) -> AppResult<(FeedBatch<S::Record>, bool)> {
        let key = self.source.source_key().to_string();

        let cursor = match stored {
            Some(v) => SyncCursor::Resume(v),
            None => self.full_cursor(),
        };

        match self.source.fetch(&cursor) {
            Ok(batch) => Ok((batch, cursor.is_full())),
            Err(FetchError::Upstream(msg)) => Err(self.upstream_error(msg)),
            Err(FetchError::CheckpointInvalid(_)) if cursor.is_full() => {
                Err(AppError::CheckpointRejected(key))
            }
            Err(FetchError::CheckpointInvalid(reason)) => {
                warn!(source = %key, %reason, "checkpoint rejected, running full resync");
                checkpoints::delete(conn, &key)?;
                ttlog_quiet(conn, "checkpoint_reset", &key, &reason);

                match self.source.fetch(&self.full_cursor()) {
                    Ok(batch) => Ok((batch, true)),
                    Err(FetchError::Upstream(msg)) => Err(self.upstream_error(msg)),
                    Err(FetchError::CheckpointInvalid(_)) => Err(AppError::CheckpointRejected(key)),
                }
            }
        }
    }

    /// Run one cycle: fetch since the checkpoint, store every record, then
    /// advance the checkpoint. Nothing is checkpointed unless every record
    /// was stored.
    pub fn run_cycle(&mut self, conn: &mut Connection, now: DateTime<Utc>) -> AppResult<SyncReport> {
        let key = self.source.source_key().to_string();
        let previous = checkpoints::get(conn, &key)?.map(|c| c.value);

        let (batch, full_resync) = self.fetch(conn, previous.clone())?;
        // A reset removed the stored value; it must not come back as fallback.
        let previous = if full_resync { None } else { previous };

        let mut report = SyncReport::new(&key);
        report.fetched = batch.records.len();
        report.full_resync = full_resync;

        let mut max_cursor: Option<String> = None;
        for record in &batch.records {
            let outcome = record.persist(conn, now)?;
            debug!(source = %key, id = record.id(), ?outcome, "record stored");
            report.record(outcome);

            let c = record.cursor();
            if max_cursor.as_ref().is_none_or(|m| c > *m) {
                max_cursor = Some(c);
            }
        }

        let next = batch.next_checkpoint.or(max_cursor).or(previous);
        if let Some(value) = &next {
            checkpoints::set(conn, &key, value, now)?;
        }
        report.checkpoint = next;

        info!(
            source = %key,
            fetched = report.fetched,
            inserted = report.inserted,
            updated = report.updated,
            unchanged = report.unchanged,
            full = report.full_resync,
            "sync cycle finished"
        );
        if report.changed() || report.full_resync {
            ttlog_quiet(conn, "sync", &key, &report.summary());
        }

        Ok(report)
    }
}
