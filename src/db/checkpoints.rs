//! Durable per-source checkpoint store.

use crate::db::rows::{get_opt_ts, get_ts, opt_ts_to_db, ts_to_db};
use crate::db::upsert::{self, UpsertOutcome, VersionedEntity};
use crate::errors::AppResult;
use crate::models::{AuditInfo, SyncCheckpoint};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_row(row: &Row) -> rusqlite::Result<SyncCheckpoint> {
    Ok(SyncCheckpoint {
        source: row.get("source")?,
        value: row.get("value")?,
        audit: AuditInfo {
            version: row.get("version")?,
            created_at: get_ts(row, "created_at")?,
            updated_at: get_opt_ts(row, "updated_at")?,
        },
    })
}

impl VersionedEntity for SyncCheckpoint {
    const KIND: &'static str = "sync_checkpoint";

    fn key(&self) -> &str {
        &self.source
    }

    fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    fn merge_from(&mut self, incoming: &Self) -> bool {
        if self.value == incoming.value {
            return false;
        }
        self.value = incoming.value.clone();
        true
    }

    fn find(conn: &Connection, key: &str) -> AppResult<Option<Self>> {
        let mut stmt = conn.prepare_cached("SELECT * FROM sync_checkpoints WHERE source = ?1")?;
        Ok(stmt.query_row([key], map_row).optional()?)
    }

    fn insert(conn: &Connection, rec: &Self) -> AppResult<()> {
        conn.execute(
            "INSERT INTO sync_checkpoints (source, value, version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                rec.source,
                rec.value,
                rec.audit.version,
                ts_to_db(&rec.audit.created_at),
                opt_ts_to_db(&rec.audit.updated_at),
            ],
        )?;
        Ok(())
    }

    fn update(conn: &Connection, rec: &Self) -> AppResult<usize> {
        let n = conn.execute(
            "UPDATE sync_checkpoints SET value = ?1, version = ?2, updated_at = ?3
             WHERE source = ?4",
            params![
                rec.value,
                rec.audit.version,
                opt_ts_to_db(&rec.audit.updated_at),
                rec.source,
            ],
        )?;
        Ok(n)
    }
}

/// Stored checkpoint of `source`, if any.
pub fn get(conn: &Connection, source: &str) -> AppResult<Option<SyncCheckpoint>> {
    SyncCheckpoint::find(conn, source)
}

/// Store `value` as the checkpoint of `source`.
pub fn set(
    conn: &mut Connection,
    source: &str,
    value: &str,
    now: DateTime<Utc>,
) -> AppResult<UpsertOutcome> {
    upsert::upsert(conn, &SyncCheckpoint::new(source, value), now)
}

/// Forget the checkpoint of `source`; the next cycle runs a full sync.
pub fn delete(conn: &Connection, source: &str) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM sync_checkpoints WHERE source = ?1", [source])? > 0)
}

pub fn list(conn: &Connection) -> AppResult<Vec<SyncCheckpoint>> {
    let mut stmt = conn.prepare("SELECT * FROM sync_checkpoints ORDER BY source ASC")?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
