use crate::db::rows::{get_coded, get_opt_ts, get_ts, ts_to_db};
use crate::db::upsert::UpsertOutcome;
use crate::errors::{AppError, AppResult};
use crate::models::{LocationClass, VehicleTrip};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

pub fn map_row(row: &Row) -> rusqlite::Result<VehicleTrip> {
    Ok(VehicleTrip {
        id: row.get("id")?,
        start: get_ts(row, "start_time")?,
        end: get_ts(row, "end_time")?,
        start_location: get_coded(
            row,
            "start_location",
            LocationClass::from_db_str,
            AppError::InvalidLocation,
        )?,
        end_location: get_coded(
            row,
            "end_location",
            LocationClass::from_db_str,
            AppError::InvalidLocation,
        )?,
        ingested_at: get_opt_ts(row, "ingested_at")?,
    })
}

/// Trips are immutable: a redelivered id is left as stored.
pub fn insert_if_absent(
    conn: &Connection,
    trip: &VehicleTrip,
    now: DateTime<Utc>,
) -> AppResult<UpsertOutcome> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO vehicle_trips
            (id, start_time, end_time, start_location, end_location, ingested_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            trip.id,
            ts_to_db(&trip.start),
            ts_to_db(&trip.end),
            trip.start_location.to_db_str(),
            trip.end_location.to_db_str(),
            ts_to_db(&now),
        ],
    )?;

    let outcome = if n == 0 {
        UpsertOutcome::Unchanged
    } else {
        UpsertOutcome::Inserted
    };
    debug!(kind = "vehicle_trip", key = %trip.id, ?outcome, "insert");
    Ok(outcome)
}

pub fn find(conn: &Connection, id: &str) -> AppResult<Option<VehicleTrip>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM vehicle_trips WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_row).optional()?)
}

/// Every trip, chronologically by start.
pub fn load_all(conn: &Connection) -> AppResult<Vec<VehicleTrip>> {
    let mut stmt = conn.prepare("SELECT * FROM vehicle_trips ORDER BY start_time ASC, id ASC")?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM vehicle_trips", [], |row| row.get(0))?)
}
