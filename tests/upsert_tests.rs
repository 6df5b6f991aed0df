mod common;
use cabinlog::db::upsert::{UpsertOutcome, update_with};
use cabinlog::db::{checkpoints, presence, reservations, trips};
use cabinlog::errors::AppError;
use cabinlog::models::{CheckEvent, EvidenceSource, PresenceStatus, Reservation};
use common::{checked_in, open_db, reservation, trip, ts};

#[test]
fn test_identical_reupsert_is_a_no_op() {
    let mut conn = open_db("upsert_identical");
    let r = reservation("r1", "2025-01-14T10:00:00Z", "2025-01-16T14:00:00Z");

    let first = reservations::upsert(&mut conn, &r, ts("2025-01-01T00:00:00Z")).unwrap();
    assert_eq!(first, UpsertOutcome::Inserted);

    let second = reservations::upsert(&mut conn, &r, ts("2025-01-02T00:00:00Z")).unwrap();
    assert_eq!(second, UpsertOutcome::Unchanged);
    assert!(first.is_change() && !second.is_change());

    let stored = reservations::find(&conn, "r1").unwrap().unwrap();
    assert_eq!(stored.audit.version, 1);
    assert_eq!(stored.audit.created_at, ts("2025-01-01T00:00:00Z"));
    assert_eq!(stored.audit.updated_at, None);
}

#[test]
fn test_changed_field_bumps_version_once() {
    let mut conn = open_db("upsert_changed");
    let mut r = reservation("r1", "2025-01-14T10:00:00Z", "2025-01-16T14:00:00Z");
    reservations::upsert(&mut conn, &r, ts("2025-01-01T00:00:00Z")).unwrap();

    r.guest_ids = vec!["g1".into(), "g2".into()];
    let outcome = reservations::upsert(&mut conn, &r, ts("2025-01-03T00:00:00Z")).unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated { version: 2 });

    let stored = reservations::find(&conn, "r1").unwrap().unwrap();
    assert_eq!(stored.audit.version, 2);
    assert_eq!(stored.audit.updated_at, Some(ts("2025-01-03T00:00:00Z")));
    assert_eq!(stored.guest_ids, vec!["g1".to_string(), "g2".to_string()]);

    // Same data again: still version 2.
    reservations::upsert(&mut conn, &r, ts("2025-01-04T00:00:00Z")).unwrap();
    let stored = reservations::find(&conn, "r1").unwrap().unwrap();
    assert_eq!(stored.audit.version, 2);
    assert_eq!(stored.audit.updated_at, Some(ts("2025-01-03T00:00:00Z")));
}

#[test]
fn test_inverted_reservation_is_rejected() {
    let mut conn = open_db("upsert_inverted");
    let mut r = reservation("bad", "2025-01-14T10:00:00Z", "2025-01-16T14:00:00Z");
    r.end = ts("2025-01-13T10:00:00Z");

    let err = reservations::upsert(&mut conn, &r, ts("2025-01-01T00:00:00Z")).unwrap_err();
    assert!(matches!(err, AppError::InvertedReservation { .. }));
    assert!(reservations::find(&conn, "bad").unwrap().is_none());

    assert!(
        Reservation::new(
            "bad",
            ts("2025-01-14T10:00:00Z"),
            ts("2025-01-13T10:00:00Z"),
            ""
        )
        .is_err()
    );
}

#[test]
fn test_update_of_deleted_entity_is_reported_missing() {
    let mut conn = open_db("upsert_missing");
    let r = reservation("gone", "2025-01-14T10:00:00Z", "2025-01-16T14:00:00Z");
    reservations::upsert(&mut conn, &r, ts("2025-01-01T00:00:00Z")).unwrap();
    assert!(reservations::delete(&conn, "gone").unwrap());

    let event = CheckEvent::new(r.start, EvidenceSource::CalendarReservation, "gone");
    let outcome = reservations::store_check_events(
        &mut conn,
        "gone",
        Some(event),
        None,
        ts("2025-01-20T00:00:00Z"),
    )
    .unwrap();
    assert_eq!(outcome, UpsertOutcome::Missing);

    let outcome = update_with::<Reservation, _>(&mut conn, "gone", ts("2025-01-20T00:00:00Z"), |_| true)
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Missing);
}

#[test]
fn test_presence_reading_dirty_check() {
    let mut conn = open_db("upsert_presence");
    let mut p = checked_in("p1", "2025-01-14T19:00:00Z");

    assert_eq!(
        presence::upsert(&mut conn, &p, ts("2025-01-15T00:00:00Z")).unwrap(),
        UpsertOutcome::Inserted
    );
    assert_eq!(
        presence::upsert(&mut conn, &p, ts("2025-01-15T01:00:00Z")).unwrap(),
        UpsertOutcome::Unchanged
    );

    p.status = PresenceStatus::CheckedOut;
    assert_eq!(
        presence::upsert(&mut conn, &p, ts("2025-01-15T02:00:00Z")).unwrap(),
        UpsertOutcome::Updated { version: 2 }
    );
    let stored = presence::find(&conn, "p1").unwrap().unwrap();
    assert_eq!(stored.status, PresenceStatus::CheckedOut);
    assert_eq!(stored.audit.updated_at, Some(ts("2025-01-15T02:00:00Z")));
}

#[test]
fn test_sub_millisecond_precision_does_not_count_as_change() {
    let mut conn = open_db("upsert_precision");
    let p = checked_in("p1", "2025-01-14T19:00:00.123456Z");

    presence::upsert(&mut conn, &p, ts("2025-01-15T00:00:00Z")).unwrap();
    let outcome = presence::upsert(&mut conn, &p, ts("2025-01-15T01:00:00Z")).unwrap();
    assert_eq!(outcome, UpsertOutcome::Unchanged);
}

#[test]
fn test_trips_are_never_mutated() {
    let conn = open_db("upsert_trips");
    let t = trip("t1", "2025-01-14T16:00:00Z", "2025-01-14T18:30:00Z", "H", "C");

    assert_eq!(
        trips::insert_if_absent(&conn, &t, ts("2025-01-15T00:00:00Z")).unwrap(),
        UpsertOutcome::Inserted
    );

    let altered = trip("t1", "2025-01-14T16:00:00Z", "2025-01-14T20:00:00Z", "H", "C");
    assert_eq!(
        trips::insert_if_absent(&conn, &altered, ts("2025-01-16T00:00:00Z")).unwrap(),
        UpsertOutcome::Unchanged
    );

    let stored = trips::find(&conn, "t1").unwrap().unwrap();
    assert_eq!(stored.end, ts("2025-01-14T18:30:00Z"));
    assert_eq!(stored.ingested_at, Some(ts("2025-01-15T00:00:00Z")));
    assert_eq!(trips::count(&conn).unwrap(), 1);
}

#[test]
fn test_checkpoint_accessors() {
    let mut conn = open_db("upsert_checkpoints");
    assert!(checkpoints::get(&conn, "presence").unwrap().is_none());

    checkpoints::set(&mut conn, "presence", "2025-01-14", ts("2025-01-15T00:00:00Z")).unwrap();
    checkpoints::set(&mut conn, "presence", "2025-01-14", ts("2025-01-15T01:00:00Z")).unwrap();
    let cp = checkpoints::get(&conn, "presence").unwrap().unwrap();
    assert_eq!(cp.value, "2025-01-14");
    assert_eq!(cp.audit.version, 1);

    let outcome =
        checkpoints::set(&mut conn, "presence", "2025-01-15", ts("2025-01-16T00:00:00Z")).unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated { version: 2 });

    checkpoints::set(&mut conn, "calendar", "tok-1", ts("2025-01-16T00:00:00Z")).unwrap();
    let keys: Vec<String> = checkpoints::list(&conn)
        .unwrap()
        .into_iter()
        .map(|c| c.source)
        .collect();
    assert_eq!(keys, vec!["calendar".to_string(), "presence".to_string()]);

    assert!(checkpoints::delete(&conn, "presence").unwrap());
    assert!(!checkpoints::delete(&conn, "presence").unwrap());
    assert!(checkpoints::get(&conn, "presence").unwrap().is_none());
}
