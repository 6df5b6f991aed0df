use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::sync::{CycleReport, SourceKind, SyncService};
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::utils::date;
use crate::utils::path::expand_tilde;
use chrono::Utc;
use std::path::PathBuf;

/// Feed file for `kind`: command line first, then configuration.
fn feed_for(kind: SourceKind, cmd_path: Option<&String>, cfg: &Config) -> Option<PathBuf> {
    cmd_path
        .map(|p| expand_tilde(p))
        .or_else(|| cfg.source(kind).feed_path())
}

fn print_report(report: &CycleReport) {
    success(report.sync.summary());
    if let Some(cp) = &report.sync.checkpoint {
        info(format!("checkpoint {} = {}", report.sync.source, cp));
    }
    if let Some(rec) = &report.reconcile {
        info(format!("reconcile: {}", rec.summary()));
        for (id, err) in &rec.failed {
            warning(format!("{id}: {err}"));
        }
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sync {
        source,
        calendar,
        trips,
        presence,
    } = cmd
    {
        let kinds: Vec<SourceKind> = match source {
            Some(k) => vec![*k],
            None => SourceKind::ALL.to_vec(),
        };

        let mut jobs = Vec::new();
        for kind in kinds {
            let cmd_path = match kind {
                SourceKind::Calendar => calendar.as_ref(),
                SourceKind::Trips => trips.as_ref(),
                SourceKind::Presence => presence.as_ref(),
            };
            match feed_for(kind, cmd_path, cfg) {
                Some(path) => jobs.push((kind, path)),
                None if source.is_some() => {
                    return Err(AppError::FeedNotConfigured(kind.key().to_string()));
                }
                None => {}
            }
        }

        if jobs.is_empty() {
            return Err(AppError::FeedNotConfigured("any".to_string()));
        }

        let mut pool = DbPool::new(&cfg.database)?;
        init_db(&pool.conn)?;

        let service = SyncService::from_config(cfg);
        let today = date::today(cfg.zone());

        for (kind, path) in jobs {
            let epoch = cfg.source(kind).epoch.clone();
            let report =
                service.run_file_source(&mut pool.conn, kind, &path, epoch, today, Utc::now())?;
            print_report(&report);
        }
    }

    Ok(())
}
