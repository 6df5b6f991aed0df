use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::reconcile::run_pass;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::utils::date;
use crate::utils::formatting::describe_source;
use crate::utils::colors::RESET;
use chrono::Utc;
use std::collections::HashMap;

fn print_sources(label: &str, counts: &HashMap<crate::models::EvidenceSource, usize>) {
    if counts.is_empty() {
        return;
    }
    let mut parts: Vec<(String, usize)> = counts
        .iter()
        .map(|(src, n)| {
            let (name, color) = describe_source(*src);
            (format!("{color}{name}{RESET}"), *n)
        })
        .collect();
    parts.sort();
    let joined: Vec<String> = parts.iter().map(|(s, n)| format!("{s}={n}")).collect();
    info(format!("{label}: {}", joined.join(", ")));
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Reconcile { today } = cmd {
        let zone = cfg.zone();
        let today = match today {
            Some(raw) => date::parse_date(raw).ok_or_else(|| AppError::InvalidDate(raw.clone()))?,
            None => date::today(zone),
        };

        let mut pool = DbPool::new(&cfg.database)?;
        init_db(&pool.conn)?;

        let report = run_pass(&mut pool.conn, zone, today, Utc::now())?;

        success(format!("Reconciled as of {today}: {}", report.summary()));
        print_sources("check-in sources", &report.check_in_sources);
        print_sources("check-out sources", &report.check_out_sources);
        for (id, err) in &report.failed {
            warning(format!("{id}: {err}"));
        }
    }

    Ok(())
}
