use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use rusqlite::Connection;

/// Reservations whose stored check-out is not after their check-in.
const INVERTED_STAYS: &str = "SELECT COUNT(*) FROM reservations
     WHERE check_in_time IS NOT NULL
       AND check_out_time IS NOT NULL
       AND check_out_time <= check_in_time";

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Db {
        migrate,
        check,
        vacuum,
        info: show_info,
    } = cmd
    else {
        return Ok(());
    };

    if !(*migrate || *check || *vacuum || *show_info) {
        warning("Nothing to do: pass --migrate, --check, --vacuum or --info.");
        return Ok(());
    }

    let mut pool = DbPool::new(&cfg.database)?;

    if *migrate {
        info("Running migrations…");
        run_pending_migrations(&pool.conn)?;
        success("Migration completed.");
    }

    if *show_info {
        stats::print_db_info(&mut pool, &cfg.database)?;
    }

    if *check {
        check_integrity(&pool.conn)?;
    }

    if *vacuum {
        info("Running VACUUM…");
        pool.conn.execute_batch("VACUUM;")?;
        success("Vacuum completed.");
    }

    Ok(())
}

/// SQLite page check followed by a check on reconciled stays.
fn check_integrity(conn: &Connection) -> AppResult<()> {
    info("Running integrity check…");

    let integrity: String = conn.query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;
    if integrity != "ok" {
        warning(format!("Integrity check failed: {integrity}"));
        return Ok(());
    }

    let inverted: i64 = conn.query_row(INVERTED_STAYS, [], |row| row.get(0))?;
    if inverted > 0 {
        warning(format!(
            "Integrity check passed, but {inverted} reservation(s) check out before they check in."
        ));
    } else {
        success("Integrity check passed.");
    }

    Ok(())
}
