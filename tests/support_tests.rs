mod common;
use cabinlog::config::{Config, SourceConfig};
use cabinlog::core::scheduler::scheduled_sources;
use cabinlog::core::sync::SourceKind;
use cabinlog::models::ReferenceZone;
use cabinlog::utils::date::{instant_range, period_bounds};
use cabinlog::utils::format_duration;
use cabinlog::utils::table::{Table, visible_width};
use chrono::Duration;
use common::{day, temp_file, ts};
use std::fs;

#[test]
fn test_reference_zone_parsing() {
    assert_eq!("Z".parse::<ReferenceZone>().unwrap(), ReferenceZone::utc());
    assert_eq!("+02:00".parse::<ReferenceZone>().unwrap().to_string(), "+02:00");
    assert_eq!("-0330".parse::<ReferenceZone>().unwrap().to_string(), "-03:30");
    assert!("+2".parse::<ReferenceZone>().is_err());
    assert!("+01:75".parse::<ReferenceZone>().is_err());

    let cet: ReferenceZone = "+01:00".parse().unwrap();
    assert_eq!(cet.date_of(ts("2025-01-14T23:30:00Z")), day("2025-01-15"));
}

#[test]
fn test_period_bounds() {
    assert_eq!(
        period_bounds("2024-02").unwrap(),
        (day("2024-02-01"), day("2024-02-29"))
    );
    assert_eq!(
        period_bounds("2024").unwrap(),
        (day("2024-01-01"), day("2024-12-31"))
    );
    assert_eq!(
        period_bounds("2024-03:2024-05-10").unwrap(),
        (day("2024-03-01"), day("2024-05-10"))
    );
    assert!(period_bounds("2024-05:2024-03").is_err());
    assert!(period_bounds("soon").is_err());
}

#[test]
fn test_instant_range_follows_zone() {
    let cet: ReferenceZone = "+01:00".parse().unwrap();
    let (start, end) = instant_range(day("2025-01-14"), day("2025-01-14"), cet);
    assert_eq!(start, ts("2025-01-13T23:00:00Z"));
    assert_eq!(end, ts("2025-01-14T23:00:00Z"));
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(Duration::minutes(40 * 60 + 30)), "40h 30m");
    assert_eq!(format_duration(Duration::minutes(-5)), "-00h 05m");
}

#[test]
fn test_table_ignores_color_codes() {
    assert_eq!(visible_width("\x1b[32mtrip\x1b[0m"), 4);

    let mut t = Table::new(&["ID", "Guest"]);
    t.add_row(vec!["r-100".into(), "\x1b[32ma\x1b[0m".into()]);
    let out = t.render();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "ID    │ Guest");
    assert!(lines[2].starts_with("r-100 │ "));
}

#[test]
fn test_config_defaults_and_partial_file() {
    let cfg = Config::default();
    assert_eq!(cfg.zone(), ReferenceZone::utc());
    assert!(cfg.reconcile_every_cycle);
    assert_eq!(cfg.calendar.interval_secs, 900);
    assert!(scheduled_sources(&cfg).is_empty());

    let path = temp_file("support_partial_config", "conf");
    fs::write(
        &path,
        "database: /tmp/cabin.sqlite\nreference_utc_offset: \"+01:00\"\ntrips:\n  feed: /tmp/trips.json\n  interval_secs: 60\n",
    )
    .unwrap();

    let cfg = Config::load_from(std::path::Path::new(&path)).unwrap();
    assert_eq!(cfg.database, "/tmp/cabin.sqlite");
    assert_eq!(cfg.zone().to_string(), "+01:00");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.presence.interval_secs, 120);
    assert_eq!(
        cfg.source(SourceKind::Trips),
        &SourceConfig {
            feed: Some("/tmp/trips.json".into()),
            interval_secs: 60,
            epoch: None,
        }
    );

    let scheduled = scheduled_sources(&cfg);
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].kind, SourceKind::Trips);
    assert_eq!(scheduled[0].every.as_secs(), 60);
}

#[test]
fn test_invalid_config_is_reported() {
    let path = temp_file("support_bad_config", "conf");
    fs::write(&path, "reference_utc_offset: \"noon\"\n").unwrap();
    assert!(Config::load_from(std::path::Path::new(&path)).is_err());
}

#[test]
fn test_source_kind_names() {
    assert_eq!("trips".parse::<SourceKind>().unwrap(), SourceKind::Trips);
    assert_eq!("vehicle_trips".parse::<SourceKind>().unwrap(), SourceKind::Trips);
    assert!("weather".parse::<SourceKind>().is_err());
    assert_eq!(SourceKind::Presence.to_string(), "presence");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_runs_each_source_once() {
    let db_path = common::setup_test_db("support_watch");
    let trips_path = temp_file("support_watch_trips", "json");
    common::write_json(
        &trips_path,
        &serde_json::json!([
            {"id": "w1", "start": "2025-01-14T16:00:00Z", "end": "2025-01-14T18:30:00Z",
             "start_location": "home", "end_location": "cabin"}
        ]),
    );

    {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        cabinlog::db::initialize::init_db(&conn).unwrap();
    }

    let mut cfg = Config::default();
    cfg.database = db_path.clone();
    cfg.trips.feed = Some(trips_path);

    cabinlog::core::scheduler::watch(&cfg, Some(1)).await.unwrap();

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    assert_eq!(cabinlog::db::trips::count(&conn).unwrap(), 1);
    assert!(cabinlog::db::checkpoints::get(&conn, "vehicle_trips").unwrap().is_some());
}
