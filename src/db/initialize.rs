use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;
use tracing::debug;

/// Prepare a connection for use and bring the schema up to date.
///
/// The scheduler opens one connection per source, so the file is switched to
/// WAL mode to let readers proceed while another source commits.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    let mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    debug!(journal_mode = %mode, "database opened");

    run_pending_migrations(conn)?;
    Ok(())
}
