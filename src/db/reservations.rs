use crate::db::rows::{get_coded, get_opt_ts, get_ts, opt_ts_to_db, to_store_precision, ts_to_db};
use crate::db::upsert::{self, UpsertOutcome, VersionedEntity};
use crate::errors::{AppError, AppResult};
use crate::models::{AuditInfo, CheckEvent, EvidenceSource, Reservation};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_COLUMNS: &str = "SELECT id, start_time, end_time, guest_ids, summary, description,
        source_created_at, source_updated_at,
        check_in_time, check_in_source, check_in_source_id,
        check_out_time, check_out_source, check_out_source_id,
        version, created_at, updated_at
 FROM reservations";

fn map_check_event(
    row: &Row,
    time_col: &str,
    source_col: &str,
    id_col: &str,
) -> rusqlite::Result<Option<CheckEvent>> {
    let Some(time) = get_opt_ts(row, time_col)? else {
        return Ok(None);
    };
    let source = get_coded(
        row,
        source_col,
        EvidenceSource::from_db_str,
        AppError::InvalidSource,
    )?;
    let source_id: String = row.get(id_col)?;
    Ok(Some(CheckEvent {
        time,
        source,
        source_id,
    }))
}

pub fn map_row(row: &Row) -> rusqlite::Result<Reservation> {
    let guests_raw: String = row.get("guest_ids")?;
    let guest_ids: Vec<String> = serde_json::from_str(&guests_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(AppError::Json(e)))
    })?;

    Ok(Reservation {
        id: row.get("id")?,
        start: get_ts(row, "start_time")?,
        end: get_ts(row, "end_time")?,
        guest_ids,
        summary: row.get("summary")?,
        description: row.get("description")?,
        source_created_at: get_opt_ts(row, "source_created_at")?,
        source_updated_at: get_opt_ts(row, "source_updated_at")?,
        check_in: map_check_event(row, "check_in_time", "check_in_source", "check_in_source_id")?,
        check_out: map_check_event(
            row,
            "check_out_time",
            "check_out_source",
            "check_out_source_id",
        )?,
        audit: AuditInfo {
            version: row.get("version")?,
            created_at: get_ts(row, "created_at")?,
            updated_at: get_opt_ts(row, "updated_at")?,
        },
    })
}

fn event_columns(ev: &Option<CheckEvent>) -> (Option<String>, Option<&'static str>, Option<String>) {
    match ev {
        Some(e) => (
            Some(ts_to_db(&e.time)),
            Some(e.source.to_db_str()),
            Some(e.source_id.clone()),
        ),
        None => (None, None, None),
    }
}

impl VersionedEntity for Reservation {
    const KIND: &'static str = "reservation";

    fn key(&self) -> &str {
        &self.id
    }

    fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    /// Calendar ingestion owns only the calendar fields; reconciled events survive.
    fn merge_from(&mut self, incoming: &Self) -> bool {
        self.merge_calendar_fields(incoming)
    }

    fn find(conn: &Connection, key: &str) -> AppResult<Option<Self>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let mut stmt = conn.prepare_cached(&sql)?;
        Ok(stmt.query_row([key], map_row).optional()?)
    }

    fn insert(conn: &Connection, r: &Self) -> AppResult<()> {
        let (ci_time, ci_source, ci_id) = event_columns(&r.check_in);
        let (co_time, co_source, co_id) = event_columns(&r.check_out);

        conn.execute(
            "INSERT INTO reservations (
                id, start_time, end_time, guest_ids, summary, description,
                source_created_at, source_updated_at,
                check_in_time, check_in_source, check_in_source_id,
                check_out_time, check_out_source, check_out_source_id,
                version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                r.id,
                ts_to_db(&r.start),
                ts_to_db(&r.end),
                serde_json::to_string(&r.guest_ids)?,
                r.summary,
                r.description,
                opt_ts_to_db(&r.source_created_at),
                opt_ts_to_db(&r.source_updated_at),
                ci_time,
                ci_source,
                ci_id,
                co_time,
                co_source,
                co_id,
                r.audit.version,
                ts_to_db(&r.audit.created_at),
                opt_ts_to_db(&r.audit.updated_at),
            ],
        )?;
        Ok(())
    }

    fn update(conn: &Connection, r: &Self) -> AppResult<usize> {
        let (ci_time, ci_source, ci_id) = event_columns(&r.check_in);
        let (co_time, co_source, co_id) = event_columns(&r.check_out);

        let n = conn.execute(
            "UPDATE reservations
             SET start_time = ?1, end_time = ?2, guest_ids = ?3, summary = ?4,
                 description = ?5, source_created_at = ?6, source_updated_at = ?7,
                 check_in_time = ?8, check_in_source = ?9, check_in_source_id = ?10,
                 check_out_time = ?11, check_out_source = ?12, check_out_source_id = ?13,
                 version = ?14, updated_at = ?15
             WHERE id = ?16",
            params![
                ts_to_db(&r.start),
                ts_to_db(&r.end),
                serde_json::to_string(&r.guest_ids)?,
                r.summary,
                r.description,
                opt_ts_to_db(&r.source_created_at),
                opt_ts_to_db(&r.source_updated_at),
                ci_time,
                ci_source,
                ci_id,
                co_time,
                co_source,
                co_id,
                r.audit.version,
                opt_ts_to_db(&r.audit.updated_at),
                r.id,
            ],
        )?;
        Ok(n)
    }
}

/// Versioned upsert of a reservation delivered by the calendar.
pub fn upsert(conn: &mut Connection, r: &Reservation, now: DateTime<Utc>) -> AppResult<UpsertOutcome> {
    r.validate()?;
    let mut rec = r.clone();
    rec.start = to_store_precision(rec.start);
    rec.end = to_store_precision(rec.end);
    rec.source_created_at = rec.source_created_at.map(to_store_precision);
    rec.source_updated_at = rec.source_updated_at.map(to_store_precision);
    upsert::upsert(conn, &rec, now)
}

/// Overwrite the reconciled events of a stored reservation.
pub fn store_check_events(
    conn: &mut Connection,
    id: &str,
    check_in: Option<CheckEvent>,
    check_out: Option<CheckEvent>,
    now: DateTime<Utc>,
) -> AppResult<UpsertOutcome> {
    upsert::update_with::<Reservation, _>(conn, id, now, |stored| {
        stored.set_check_events(check_in, check_out)
    })
}

pub fn find(conn: &Connection, id: &str) -> AppResult<Option<Reservation>> {
    <Reservation as VersionedEntity>::find(conn, id)
}

/// All reservations, ordered by start.
pub fn load_all(conn: &Connection) -> AppResult<Vec<Reservation>> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY start_time ASC, id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// All reservations, ordered by start, decoding each row on its own.
///
/// Rows that cannot be decoded are returned by id with their error instead
/// of failing the whole load.
pub fn load_all_lenient(conn: &Connection) -> AppResult<(Vec<Reservation>, Vec<(String, AppError)>)> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY start_time ASC, id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;

    let mut loaded = Vec::new();
    let mut unreadable = Vec::new();
    while let Some(row) = rows.next()? {
        match map_row(row) {
            Ok(r) => loaded.push(r),
            Err(e) => {
                let id: String = row.get("id").unwrap_or_default();
                unreadable.push((id, AppError::Db(e)));
            }
        }
    }
    Ok((loaded, unreadable))
}

/// Reservations overlapping `[from, to)`.
pub fn load_between(
    conn: &Connection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> AppResult<Vec<Reservation>> {
    let sql = format!("{SELECT_COLUMNS} WHERE start_time < ?2 AND end_time >= ?1 ORDER BY start_time ASC, id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![ts_to_db(&from), ts_to_db(&to)], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn delete(conn: &Connection, id: &str) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM reservations WHERE id = ?1", [id])? > 0)
}
