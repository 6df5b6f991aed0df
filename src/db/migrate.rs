use crate::errors::AppResult;
use rusqlite::{Connection, OptionalExtension, Result};
use tracing::info;

/// Ensure that the `log` table exists. Migrations record themselves here.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Check whether `table` already has `column`.
fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

struct Migration {
    version: &'static str,
    message: &'static str,
    apply: fn(&Connection) -> Result<()>,
}

fn create_core_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS reservations (
            id                 TEXT PRIMARY KEY,
            start_time         TEXT NOT NULL,
            end_time           TEXT NOT NULL,
            guest_ids          TEXT NOT NULL DEFAULT '[]',   -- JSON array
            summary            TEXT NOT NULL DEFAULT '',
            description        TEXT,
            source_created_at  TEXT,
            source_updated_at  TEXT,
            check_in_time      TEXT,
            check_in_source    TEXT,
            check_in_source_id TEXT,
            check_out_time     TEXT,
            check_out_source   TEXT,
            check_out_source_id TEXT,
            version            INTEGER NOT NULL DEFAULT 1,
            created_at         TEXT NOT NULL,
            updated_at         TEXT
        );

        CREATE TABLE IF NOT EXISTS vehicle_trips (
            id              TEXT PRIMARY KEY,
            start_time      TEXT NOT NULL,
            end_time        TEXT NOT NULL,
            start_location  TEXT NOT NULL CHECK (start_location IN ('H','C','O')),
            end_location    TEXT NOT NULL CHECK (end_location IN ('H','C','O')),
            ingested_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS presence_readings (
            id          TEXT PRIMARY KEY,
            instant     TEXT NOT NULL,
            status      TEXT NOT NULL CHECK (status IN ('CHECKED_IN','CHECKED_OUT')),
            version     INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL,
            updated_at  TEXT
        );

        CREATE TABLE IF NOT EXISTS sync_checkpoints (
            source      TEXT PRIMARY KEY,
            value       TEXT NOT NULL,
            version     INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL,
            updated_at  TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_reservations_start ON reservations(start_time);
        CREATE INDEX IF NOT EXISTS idx_trips_start ON vehicle_trips(start_time);
        CREATE INDEX IF NOT EXISTS idx_presence_instant ON presence_readings(instant);
        "#,
    )
}

/// Older databases were created before guests were tracked per reservation.
fn add_guest_ids_column(conn: &Connection) -> Result<()> {
    if has_column(conn, "reservations", "guest_ids")? {
        return Ok(());
    }
    conn.execute(
        "ALTER TABLE reservations ADD COLUMN guest_ids TEXT NOT NULL DEFAULT '[]'",
        [],
    )?;
    Ok(())
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250110_0001_core_tables",
        message: "Created reservations, vehicle_trips, presence_readings and sync_checkpoints",
        apply: create_core_tables,
    },
    Migration {
        version: "20250203_0002_reservation_guest_ids",
        message: "Added guest_ids to reservations",
        apply: add_guest_ids_column,
    },
];

/// Public entry point: run all pending migrations.
///
/// Called by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }

        (m.apply)(conn).map_err(|e| {
            crate::errors::AppError::Migration(format!("{}: {}", m.version, e))
        })?;
        mark_applied(conn, m.version, m.message)?;

        info!(version = m.version, "migration applied");
    }

    Ok(())
}
