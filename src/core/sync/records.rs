use crate::db::rows::ts_to_db;
use crate::db::upsert::UpsertOutcome;
use crate::db::{presence, reservations, trips};
use crate::errors::AppResult;
use crate::models::{PresenceReading, Reservation, VehicleTrip};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;

/// A record type that a feed delivers and the store can absorb.
pub trait SyncRecord {
    fn id(&self) -> &str;

    /// Store the record with the entity's idempotent write rule.
    fn persist(&self, conn: &mut Connection, now: DateTime<Utc>) -> AppResult<UpsertOutcome>;

    /// Canonical, lexicographically ordered position of the record in its feed.
    fn cursor(&self) -> String;

    /// Whether the record is at or after `cursor`. Unreadable cursors select everything.
    fn is_since(&self, cursor: &str) -> bool;
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    raw.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

impl SyncRecord for Reservation {
    fn id(&self) -> &str {
        &self.id
    }

    fn persist(&self, conn: &mut Connection, now: DateTime<Utc>) -> AppResult<UpsertOutcome> {
        reservations::upsert(conn, self, now)
    }

    fn cursor(&self) -> String {
        ts_to_db(&self.source_updated_at.unwrap_or(self.start))
    }

    fn is_since(&self, cursor: &str) -> bool {
        parse_instant(cursor).is_none_or(|c| self.source_updated_at.unwrap_or(self.start) >= c)
    }
}

impl SyncRecord for VehicleTrip {
    fn id(&self) -> &str {
        &self.id
    }

    fn persist(&self, conn: &mut Connection, now: DateTime<Utc>) -> AppResult<UpsertOutcome> {
        trips::insert_if_absent(conn, self, now)
    }

    fn cursor(&self) -> String {
        ts_to_db(&self.start)
    }

    fn is_since(&self, cursor: &str) -> bool {
        parse_instant(cursor).is_none_or(|c| self.start >= c)
    }
}

impl SyncRecord for PresenceReading {
    fn id(&self) -> &str {
        &self.id
    }

    fn persist(&self, conn: &mut Connection, now: DateTime<Utc>) -> AppResult<UpsertOutcome> {
        presence::upsert(conn, self, now)
    }

    /// Day granularity: the whole last day is redelivered next cycle.
    fn cursor(&self) -> String {
        self.instant.date_naive().format("%Y-%m-%d").to_string()
    }

    fn is_since(&self, cursor: &str) -> bool {
        parse_day(cursor).is_none_or(|c| self.instant.date_naive() >= c)
    }
}
