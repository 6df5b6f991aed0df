#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use cabinlog::db::initialize::init_db;
use cabinlog::models::{
    LocationClass, PresenceReading, PresenceStatus, ReferenceZone, Reservation, VehicleTrip,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn cabinlog() -> Command {
    cargo_bin_cmd!("cabinlog")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_cabinlog.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary file path inside tempdir and ensure it's removed
pub fn temp_file(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_cabinlog.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Fresh, migrated database.
pub fn open_db(name: &str) -> Connection {
    let path = setup_test_db(name);
    let conn = Connection::open(&path).expect("open db");
    init_db(&conn).expect("init db");
    conn
}

pub fn write_json(path: &str, value: &serde_json::Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).expect("write feed file");
}

pub fn utc() -> ReferenceZone {
    ReferenceZone::utc()
}

pub fn ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid rfc3339")
        .with_timezone(&Utc)
}

pub fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
}

fn loc(code: &str) -> LocationClass {
    LocationClass::from_code(code).expect("H, C or O")
}

/// `trip("t1", "2025-01-14T16:00:00Z", "2025-01-14T18:30:00Z", "H", "C")`
pub fn trip(id: &str, start: &str, end: &str, from: &str, to: &str) -> VehicleTrip {
    VehicleTrip::new(id, ts(start), ts(end), loc(from), loc(to))
}

pub fn reservation(id: &str, start: &str, end: &str) -> Reservation {
    Reservation::new(id, ts(start), ts(end), format!("Stay {id}")).expect("valid reservation")
}

pub fn checked_in(id: &str, instant: &str) -> PresenceReading {
    PresenceReading::new(id, ts(instant), PresenceStatus::CheckedIn)
}

pub fn checked_out(id: &str, instant: &str) -> PresenceReading {
    PresenceReading::new(id, ts(instant), PresenceStatus::CheckedOut)
}

/// Home → cabin on the 14th, cabin → home on the 16th.
pub fn january_visit() -> Vec<VehicleTrip> {
    vec![
        trip("t1", "2025-01-14T16:00:00Z", "2025-01-14T18:30:00Z", "H", "C"),
        trip("t2", "2025-01-16T11:00:00Z", "2025-01-16T13:15:00Z", "C", "H"),
    ]
}
