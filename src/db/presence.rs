use crate::db::rows::{get_coded, get_opt_ts, get_ts, opt_ts_to_db, to_store_precision, ts_to_db};
use crate::db::upsert::{self, UpsertOutcome, VersionedEntity};
use crate::errors::{AppError, AppResult};
use crate::models::{AuditInfo, PresenceReading, PresenceStatus};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn map_row(row: &Row) -> rusqlite::Result<PresenceReading> {
    Ok(PresenceReading {
        id: row.get("id")?,
        instant: get_ts(row, "instant")?,
        status: get_coded(
            row,
            "status",
            PresenceStatus::from_db_str,
            AppError::InvalidStatus,
        )?,
        audit: AuditInfo {
            version: row.get("version")?,
            created_at: get_ts(row, "created_at")?,
            updated_at: get_opt_ts(row, "updated_at")?,
        },
    })
}

impl VersionedEntity for PresenceReading {
    const KIND: &'static str = "presence_reading";

    fn key(&self) -> &str {
        &self.id
    }

    fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    fn merge_from(&mut self, incoming: &Self) -> bool {
        if self.instant == incoming.instant && self.status == incoming.status {
            return false;
        }
        self.instant = incoming.instant;
        self.status = incoming.status;
        true
    }

    fn find(conn: &Connection, key: &str) -> AppResult<Option<Self>> {
        let mut stmt = conn.prepare_cached("SELECT * FROM presence_readings WHERE id = ?1")?;
        Ok(stmt.query_row([key], map_row).optional()?)
    }

    fn insert(conn: &Connection, rec: &Self) -> AppResult<()> {
        conn.execute(
            "INSERT INTO presence_readings (id, instant, status, version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                rec.id,
                ts_to_db(&rec.instant),
                rec.status.to_db_str(),
                rec.audit.version,
                ts_to_db(&rec.audit.created_at),
                opt_ts_to_db(&rec.audit.updated_at),
            ],
        )?;
        Ok(())
    }

    fn update(conn: &Connection, rec: &Self) -> AppResult<usize> {
        let n = conn.execute(
            "UPDATE presence_readings
             SET instant = ?1, status = ?2, version = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                ts_to_db(&rec.instant),
                rec.status.to_db_str(),
                rec.audit.version,
                opt_ts_to_db(&rec.audit.updated_at),
                rec.id,
            ],
        )?;
        Ok(n)
    }
}

pub fn upsert(
    conn: &mut Connection,
    reading: &PresenceReading,
    now: DateTime<Utc>,
) -> AppResult<UpsertOutcome> {
    let mut rec = reading.clone();
    rec.instant = to_store_precision(rec.instant);
    upsert::upsert(conn, &rec, now)
}

pub fn find(conn: &Connection, id: &str) -> AppResult<Option<PresenceReading>> {
    <PresenceReading as VersionedEntity>::find(conn, id)
}

/// All readings chronologically; equal instants keep ingestion order.
pub fn load_all(conn: &Connection) -> AppResult<Vec<PresenceReading>> {
    let mut stmt = conn.prepare("SELECT * FROM presence_readings ORDER BY instant ASC, rowid ASC")?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
