//! Column conversion helpers shared by the entity repositories.

use crate::errors::AppError;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

/// Fixed-width RFC 3339 (millisecond precision, `Z` suffix), so text order is time order.
pub fn ts_to_db(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `ts` at the precision the store keeps, so stored and incoming values compare equal.
pub fn to_store_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(3)
}

pub fn opt_ts_to_db(ts: &Option<DateTime<Utc>>) -> Option<String> {
    ts.as_ref().map(ts_to_db)
}

fn conversion_failure(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_ts(raw: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| conversion_failure(idx, AppError::InvalidTimestamp(raw.to_string())))
}

/// Read a mandatory RFC 3339 column.
pub fn get_ts(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let idx = row.as_ref().column_index(column)?;
    let raw: String = row.get(idx)?;
    parse_ts(&raw, idx)
}

/// Read a nullable RFC 3339 column.
pub fn get_opt_ts(row: &Row, column: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let idx = row.as_ref().column_index(column)?;
    let raw: Option<String> = row.get(idx)?;
    raw.map(|r| parse_ts(&r, idx)).transpose()
}

/// Read a text column and decode it with `decode`, failing with `err` otherwise.
pub fn get_coded<T>(
    row: &Row,
    column: &str,
    decode: impl Fn(&str) -> Option<T>,
    err: impl Fn(String) -> AppError,
) -> rusqlite::Result<T> {
    let idx = row.as_ref().column_index(column)?;
    let raw: String = row.get(idx)?;
    decode(&raw).ok_or_else(|| conversion_failure(idx, err(raw)))
}
