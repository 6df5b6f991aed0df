use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::json;
use std::fs;

mod common;
use common::{cabinlog, setup_test_db, temp_file, write_json};

fn init(db_path: &str) {
    cabinlog()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Calendar, trip and presence feeds for one January stay.
fn write_feeds(name: &str) -> (String, String, String) {
    let calendar = temp_file(&format!("{name}_calendar"), "json");
    write_json(
        &calendar,
        &json!({
            "sync_token": "tok-1",
            "reservations": [
                {"id": "r1", "start": "2025-01-14T10:00:00Z", "end": "2025-01-16T14:00:00Z",
                 "summary": "Weekend", "guest_ids": ["g1", "g2"]},
                {"id": "r2", "start": "2025-02-07T10:00:00Z", "end": "2025-02-09T14:00:00Z",
                 "summary": "Ski trip"}
            ]
        }),
    );

    let trips = temp_file(&format!("{name}_trips"), "json");
    write_json(
        &trips,
        &json!([
            {"id": "t1", "start": "2025-01-14T16:00:00Z", "end": "2025-01-14T18:30:00Z",
             "start_location": "home", "end_location": "cabin"},
            {"id": "t2", "start": "2025-01-16T11:00:00Z", "end": "2025-01-16T13:15:00Z",
             "start_location": "cabin", "end_location": "home"}
        ]),
    );

    let presence = temp_file(&format!("{name}_presence"), "json");
    write_json(
        &presence,
        &json!([
            {"id": "p1", "instant": "2025-02-07T19:00:00Z", "status": "CHECKED_IN"}
        ]),
    );

    (calendar, trips, presence)
}

fn sync_all(db_path: &str, feeds: &(String, String, String)) {
    cabinlog()
        .args([
            "--db",
            db_path,
            "--test",
            "sync",
            "--calendar",
            &feeds.0,
            "--trips",
            &feeds.1,
            "--presence",
            &feeds.2,
        ])
        .assert()
        .success()
        .stdout(contains("calendar: 2 fetched, 2 inserted"))
        .stdout(contains("vehicle_trips: 2 fetched, 2 inserted"))
        .stdout(contains("presence: 1 fetched, 1 inserted"));
}

#[test]
fn test_init_creates_database() {
    let db_path = setup_test_db("cli_init");
    cabinlog()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));
    assert!(fs::metadata(&db_path).is_ok());

    cabinlog()
        .args(["--db", &db_path, "--test", "db", "--info"])
        .assert()
        .success()
        .stdout(contains("Reservations:"))
        .stdout(contains("Checkpoints:"));
}

#[test]
fn test_sync_then_list_shows_sources() {
    let db_path = setup_test_db("cli_sync_list");
    init(&db_path);
    let feeds = write_feeds("cli_sync_list");
    sync_all(&db_path, &feeds);

    cabinlog()
        .args(["--db", &db_path, "--test", "list"])
        .assert()
        .success()
        .stdout(contains("r1"))
        .stdout(contains("r2"))
        .stdout(contains("trip"))
        .stdout(contains("sensor"))
        .stdout(contains("40h 30m"));

    cabinlog()
        .args(["--db", &db_path, "--test", "list", "--period", "2025-02"])
        .assert()
        .success()
        .stdout(contains("r2").and(contains("r1").not()));
}

#[test]
fn test_second_sync_is_a_no_op() {
    let db_path = setup_test_db("cli_sync_twice");
    init(&db_path);
    let feeds = write_feeds("cli_sync_twice");
    sync_all(&db_path, &feeds);

    cabinlog()
        .args(["--db", &db_path, "--test", "sync", "--source", "calendar", "--calendar", &feeds.0])
        .assert()
        .success()
        .stdout(contains("calendar: 0 fetched"));

    cabinlog()
        .args(["--db", &db_path, "--test", "checkpoint", "--list"])
        .assert()
        .success()
        .stdout(contains("calendar"))
        .stdout(contains("tok-1"))
        .stdout(contains("vehicle_trips"))
        .stdout(contains("2025-02-07"));
}

#[test]
fn test_checkpoint_reset_forces_full_sync() {
    let db_path = setup_test_db("cli_checkpoint_reset");
    init(&db_path);
    let feeds = write_feeds("cli_checkpoint_reset");
    sync_all(&db_path, &feeds);

    cabinlog()
        .args(["--db", &db_path, "--test", "checkpoint", "--reset", "trips"])
        .assert()
        .success()
        .stdout(contains("next sync is a full sync"));

    cabinlog()
        .args(["--db", &db_path, "--test", "sync", "--source", "trips", "--trips", &feeds.1])
        .assert()
        .success()
        .stdout(contains("vehicle_trips: 2 fetched, 0 inserted, 0 updated, 2 unchanged (full)"));

    cabinlog()
        .args(["--db", &db_path, "--test", "log", "--print"])
        .assert()
        .success()
        .stdout(contains("checkpoint_reset"))
        .stdout(contains("migration_applied"));
}

#[test]
fn test_sync_without_feed_fails() {
    let db_path = setup_test_db("cli_sync_no_feed");
    init(&db_path);

    cabinlog()
        .args(["--db", &db_path, "--test", "sync", "--source", "presence"])
        .assert()
        .failure()
        .stderr(contains("No feed configured for source 'presence'"));
}

#[test]
fn test_sync_missing_file_is_upstream_failure() {
    let db_path = setup_test_db("cli_sync_missing_file");
    init(&db_path);

    cabinlog()
        .args([
            "--db",
            &db_path,
            "--test",
            "sync",
            "--source",
            "trips",
            "--trips",
            "/nonexistent/cabinlog/trips.json",
        ])
        .assert()
        .failure()
        .stderr(contains("Upstream fetch failed for 'vehicle_trips'"));
}

#[test]
fn test_reconcile_as_of_date() {
    let db_path = setup_test_db("cli_reconcile_today");
    init(&db_path);
    let feeds = write_feeds("cli_reconcile_today");
    sync_all(&db_path, &feeds);

    cabinlog()
        .args(["--db", &db_path, "--test", "reconcile", "--today", "2025-01-15"])
        .assert()
        .success()
        .stdout(contains("Reconciled as of 2025-01-15"))
        .stdout(contains("2 reservations"));

    cabinlog()
        .args(["--db", &db_path, "--test", "reconcile", "--today", "15/01/2025"])
        .assert()
        .failure()
        .stderr(contains("Invalid date format"));
}

#[test]
fn test_export_csv_and_json() {
    let db_path = setup_test_db("cli_export");
    init(&db_path);
    let feeds = write_feeds("cli_export");
    sync_all(&db_path, &feeds);

    let csv_out = temp_file("cli_export_out", "csv");
    cabinlog()
        .args(["--db", &db_path, "--test", "export", "--format", "csv", "--file", &csv_out])
        .assert()
        .success()
        .stdout(contains("CSV export completed"));

    let content = fs::read_to_string(&csv_out).unwrap();
    assert!(content.starts_with("id,start,end,guests,summary,check_in,check_in_source"));
    assert!(content.contains("VEHICLE_TRIP"));
    assert!(content.contains("g1;g2"));
    assert!(content.contains("40h 30m"));

    let json_out = temp_file("cli_export_out", "json");
    cabinlog()
        .args([
            "--db", &db_path, "--test", "export", "--format", "json", "--file", &json_out,
            "--period", "2025-02",
        ])
        .assert()
        .success();

    let rows: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_out).unwrap()).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "r2");
    assert_eq!(rows[0]["check_in_source"], "PRESENCE_SENSOR");

    // Existing file without --force and no confirmation on stdin.
    cabinlog()
        .args(["--db", &db_path, "--test", "export", "--format", "json", "--file", &json_out])
        .write_stdin("n\n")
        .assert()
        .failure()
        .stderr(contains("export cancelled"));

    cabinlog()
        .args([
            "--db", &db_path, "--test", "export", "--format", "json", "--file", &json_out, "--force",
        ])
        .assert()
        .success();
}

#[test]
fn test_db_check_and_vacuum() {
    let db_path = setup_test_db("cli_db_check");
    init(&db_path);

    cabinlog()
        .args(["--db", &db_path, "--test", "db", "--check", "--vacuum", "--migrate"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"))
        .stdout(contains("Vacuum completed"))
        .stdout(contains("Migration completed"));
}

#[test]
fn test_config_print_in_test_mode() {
    cabinlog()
        .args(["--test", "config", "--print"])
        .assert()
        .success()
        .stdout(contains("reference_utc_offset:").and(contains("00:00")))
        .stdout(contains("reconcile_every_cycle: true"))
        .stdout(contains("interval_secs"));
}

#[test]
fn test_read_commands_on_a_fresh_database() {
    let db_path = setup_test_db("cli_fresh_db");

    cabinlog()
        .args(["--db", &db_path, "--test", "checkpoint", "--list"])
        .assert()
        .success()
        .stdout(contains("No checkpoints stored."));

    cabinlog()
        .args(["--db", &db_path, "--test", "list"])
        .assert()
        .success()
        .stdout(contains("No reservations found."));
}
