//! Periodic sync of every configured feed.
//!
//! Each source runs in its own task with its own interval. The SQLite work
//! of a tick happens on the blocking pool with a fresh connection, so tasks
//! share nothing but the database file.

use crate::config::Config;
use crate::core::sync::{CycleReport, SourceKind, SyncService};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

/// Smallest accepted polling interval.
pub const MIN_INTERVAL_SECS: u64 = 1;

/// A source that has a feed configured.
#[derive(Debug, Clone)]
pub struct ScheduledSource {
    pub kind: SourceKind,
    pub feed: PathBuf,
    pub every: Duration,
    pub epoch: Option<String>,
}

/// Sources to poll, in calendar / trips / presence order.
pub fn scheduled_sources(cfg: &Config) -> Vec<ScheduledSource> {
    SourceKind::ALL
        .iter()
        .filter_map(|kind| {
            let sc = cfg.source(*kind);
            sc.feed_path().map(|feed| ScheduledSource {
                kind: *kind,
                feed,
                every: Duration::from_secs(sc.interval_secs.max(MIN_INTERVAL_SECS)),
                epoch: sc.epoch.clone(),
            })
        })
        .collect()
}

fn run_tick(db_path: &str, service: SyncService, src: &ScheduledSource) -> AppResult<CycleReport> {
    let mut pool = DbPool::new(db_path)?;
    let now = Utc::now();
    let today = service.zone().date_of(now);
    service.run_file_source(
        &mut pool.conn,
        src.kind,
        &src.feed,
        src.epoch.clone(),
        today,
        now,
    )
}

async fn poll_source(db_path: String, service: SyncService, src: ScheduledSource, cycles: Option<u64>) {
    let mut ticker = interval(src.every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(source = %src.kind, every_secs = src.every.as_secs(), "polling started");

    let mut done = 0u64;
    loop {
        ticker.tick().await;

        let path = db_path.clone();
        let job = src.clone();
        let result = tokio::task::spawn_blocking(move || run_tick(&path, service, &job)).await;

        match result {
            Ok(Ok(report)) => {
                info!(source = %src.kind, "{}", report.sync.summary());
                if let Some(rec) = &report.reconcile {
                    info!(source = %src.kind, "{}", rec.summary());
                }
            }
            // The checkpoint is untouched; the next tick retries from it.
            Ok(Err(e)) => warn!(source = %src.kind, error = %e, "sync cycle failed"),
            Err(e) => error!(source = %src.kind, error = %e, "sync task aborted"),
        }

        done += 1;
        if cycles.is_some_and(|max| done >= max) {
            break;
        }
    }
}

/// Poll every configured source until Ctrl-C, or until each ran `cycles` times.
pub async fn watch(cfg: &Config, cycles: Option<u64>) -> AppResult<()> {
    let sources = scheduled_sources(cfg);
    if sources.is_empty() {
        return Err(AppError::FeedNotConfigured("any".to_string()));
    }

    let service = SyncService::from_config(cfg);
    let mut tasks = JoinSet::new();
    for src in sources {
        tasks.spawn(poll_source(cfg.database.clone(), service, src, cycles));
    }

    let interrupted = tokio::select! {
        _ = async { while tasks.join_next().await.is_some() {} } => false,
        res = tokio::signal::ctrl_c() => {
            res?;
            true
        }
    };

    if interrupted {
        info!("interrupted, stopping scheduler");
        tasks.shutdown().await;
    } else {
        info!("all sources finished");
    }

    Ok(())
}
