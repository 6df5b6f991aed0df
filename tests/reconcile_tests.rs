mod common;
use cabinlog::core::presence_index::PresenceIndex;
use cabinlog::core::reconcile::{reconcile, run_pass};
use cabinlog::core::segmenter::segment;
use cabinlog::db::{presence, reservations, trips};
use cabinlog::models::{EvidenceSource, PresenceStatus};
use chrono::Duration;
use common::{
    checked_in, checked_out, day, january_visit, open_db, reservation, trip, ts, utc,
};

fn january_stay() -> cabinlog::models::Reservation {
    reservation("r1", "2025-01-14T10:00:00Z", "2025-01-16T14:00:00Z")
}

#[test]
fn test_trip_evidence_scenario() {
    let out = reconcile(&[january_stay()], &january_visit(), &[], day("2025-01-20"), utc());
    let r = &out[0];

    let ci = r.check_in.as_ref().unwrap();
    assert_eq!(ci.time, ts("2025-01-14T18:30:00Z"));
    assert_eq!(ci.source, EvidenceSource::VehicleTrip);
    assert_eq!(ci.source_id, "t1");

    let co = r.check_out.as_ref().unwrap();
    assert_eq!(co.time, ts("2025-01-16T11:00:00Z"));
    assert_eq!(co.source, EvidenceSource::VehicleTrip);
    assert_eq!(co.source_id, "t2");

    assert_eq!(r.duration(), Some(Duration::minutes(40 * 60 + 30)));
}

#[test]
fn test_presence_evidence_scenario() {
    let readings = vec![checked_in("p1", "2025-01-14T19:00:00Z")];
    let out = reconcile(&[january_stay()], &[], &readings, day("2025-01-20"), utc());

    let ci = out[0].check_in.as_ref().unwrap();
    assert_eq!(ci.time, ts("2025-01-14T19:00:00Z"));
    assert_eq!(ci.source, EvidenceSource::PresenceSensor);
    assert_eq!(ci.source_id, "p1");

    // Nothing for the departure day: calendar fallback.
    let co = out[0].check_out.as_ref().unwrap();
    assert_eq!(co.source, EvidenceSource::CalendarReservation);
    assert_eq!(co.time, ts("2025-01-16T14:00:00Z"));
}

#[test]
fn test_trip_evidence_beats_presence() {
    let readings = vec![
        checked_in("p1", "2025-01-14T19:00:00Z"),
        checked_out("p2", "2025-01-16T10:00:00Z"),
    ];
    let out = reconcile(&[january_stay()], &january_visit(), &readings, day("2025-01-20"), utc());

    assert_eq!(out[0].check_in.as_ref().unwrap().source, EvidenceSource::VehicleTrip);
    assert_eq!(out[0].check_out.as_ref().unwrap().source, EvidenceSource::VehicleTrip);
}

#[test]
fn test_calendar_fallback_without_evidence() {
    let r = january_stay();
    let out = reconcile(&[r.clone()], &[], &[], day("2025-01-20"), utc());

    let ci = out[0].check_in.as_ref().unwrap();
    assert_eq!(ci.time, r.start);
    assert_eq!(ci.source, EvidenceSource::CalendarReservation);
    assert_eq!(ci.source_id, "r1");
}

#[test]
fn test_future_reservation_gets_no_events() {
    let out = reconcile(&[january_stay()], &january_visit(), &[], day("2025-01-13"), utc());
    assert!(out[0].check_in.is_none());
    assert!(out[0].check_out.is_none());
    assert!(out[0].duration().is_none());
}

#[test]
fn test_ongoing_reservation_gets_check_in_only() {
    let out = reconcile(&[january_stay()], &january_visit(), &[], day("2025-01-15"), utc());
    assert!(out[0].check_in.is_some());
    assert!(out[0].check_out.is_none());
    assert!(out[0].duration().is_none());
}

#[test]
fn test_reconcile_is_idempotent() {
    let readings = vec![checked_in("p1", "2025-01-14T19:00:00Z")];
    let first = reconcile(&[january_stay()], &january_visit(), &readings, day("2025-01-20"), utc());
    let second = reconcile(&first, &january_visit(), &readings, day("2025-01-20"), utc());
    assert_eq!(first, second);
}

#[test]
fn test_first_presence_reading_wins() {
    let readings = vec![
        checked_in("late", "2025-01-14T21:00:00Z"),
        checked_in("early", "2025-01-14T19:00:00Z"),
    ];
    let index = PresenceIndex::build(&readings, utc());

    assert_eq!(index.first_checked_in_on(day("2025-01-14")).unwrap().id, "late");
    assert!(index.first_checked_out_on(day("2025-01-14")).is_none());
    assert_eq!(index.readings_on(day("2025-01-14")).len(), 2);
    assert!(index.readings_on(day("2025-01-15")).is_empty());
    assert_eq!(index.date_count(), 1);
    assert_eq!(
        index
            .first_with_status(day("2025-01-14"), PresenceStatus::CheckedIn)
            .unwrap()
            .id,
        "late"
    );
}

#[test]
fn test_late_arrival_is_not_credited_to_the_next_stay() {
    // The first guests arrive late on the 14th; the next guests start on the 15th.
    let trips = vec![trip("r1_in", "2025-01-14T19:00:00Z", "2025-01-14T22:00:00Z", "H", "C")];
    let readings = vec![checked_in("p_r2", "2025-01-15T16:00:00Z")];
    let stays = vec![
        reservation("r1", "2025-01-13T14:00:00Z", "2025-01-15T10:00:00Z"),
        reservation("r2", "2025-01-15T14:00:00Z", "2025-01-17T10:00:00Z"),
    ];
    let out = reconcile(&stays, &trips, &readings, day("2025-01-20"), utc());

    let first = out[0].check_in.as_ref().unwrap();
    assert_eq!(first.source, EvidenceSource::VehicleTrip);
    assert_eq!(first.source_id, "r1_in");

    let second = out[1].check_in.as_ref().unwrap();
    assert_eq!(second.source, EvidenceSource::PresenceSensor);
    assert_eq!(second.source_id, "p_r2");
}

#[test]
fn test_back_to_back_stays_keep_their_own_trips() {
    let trips = vec![
        trip("a_in", "2025-01-10T08:00:00Z", "2025-01-10T10:00:00Z", "H", "C"),
        trip("a_out", "2025-01-12T09:00:00Z", "2025-01-12T10:00:00Z", "C", "O"),
        trip("b_in", "2025-01-20T14:00:00Z", "2025-01-20T15:00:00Z", "O", "C"),
        trip("b_out", "2025-01-22T16:00:00Z", "2025-01-22T18:00:00Z", "C", "H"),
    ];
    let stays = vec![
        reservation("a", "2025-01-10T12:00:00Z", "2025-01-12T10:00:00Z"),
        reservation("b", "2025-01-20T12:00:00Z", "2025-01-22T10:00:00Z"),
    ];
    let out = reconcile(&stays, &trips, &[], day("2025-01-30"), utc());

    let a_out = out[0].check_out.as_ref().unwrap();
    assert_eq!(a_out.source, EvidenceSource::VehicleTrip);
    assert_eq!(a_out.source_id, "a_out");

    let b_in = out[1].check_in.as_ref().unwrap();
    assert_eq!(b_in.source, EvidenceSource::VehicleTrip);
    assert_eq!(b_in.source_id, "b_in");
}

#[test]
fn test_run_pass_stores_events_and_is_stable() {
    let mut conn = open_db("reconcile_run_pass");
    let now = ts("2025-01-20T08:00:00Z");

    reservations::upsert(&mut conn, &january_stay(), now).unwrap();
    for t in january_visit() {
        trips::insert_if_absent(&conn, &t, now).unwrap();
    }

    let report = run_pass(&mut conn, utc(), day("2025-01-20"), now).unwrap();
    assert_eq!(report.total, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(report.check_in_sources.get(&EvidenceSource::VehicleTrip), Some(&1));

    let stored = reservations::find(&conn, "r1").unwrap().unwrap();
    assert_eq!(stored.check_in.as_ref().unwrap().time, ts("2025-01-14T18:30:00Z"));
    assert_eq!(stored.audit.version, 2);

    let again = run_pass(&mut conn, utc(), day("2025-01-20"), now).unwrap();
    assert_eq!(again.updated, 0);
    assert_eq!(again.unchanged, 1);
    let stored = reservations::find(&conn, "r1").unwrap().unwrap();
    assert_eq!(stored.audit.version, 2);
}

#[test]
fn test_backfilled_trip_supersedes_sensor_evidence() {
    let mut conn = open_db("reconcile_backfill");
    let now = ts("2025-01-20T08:00:00Z");

    reservations::upsert(&mut conn, &january_stay(), now).unwrap();
    presence::upsert(&mut conn, &checked_in("p1", "2025-01-14T19:00:00Z"), now).unwrap();
    run_pass(&mut conn, utc(), day("2025-01-20"), now).unwrap();

    let stored = reservations::find(&conn, "r1").unwrap().unwrap();
    assert_eq!(stored.check_in.unwrap().source, EvidenceSource::PresenceSensor);

    for t in january_visit() {
        trips::insert_if_absent(&conn, &t, now).unwrap();
    }
    run_pass(&mut conn, utc(), day("2025-01-20"), now).unwrap();

    let stored = reservations::find(&conn, "r1").unwrap().unwrap();
    assert_eq!(stored.check_in.unwrap().source, EvidenceSource::VehicleTrip);
}

#[test]
fn test_calendar_resync_keeps_reconciled_events() {
    let mut conn = open_db("reconcile_calendar_resync");
    let now = ts("2025-01-20T08:00:00Z");

    reservations::upsert(&mut conn, &january_stay(), now).unwrap();
    run_pass(&mut conn, utc(), day("2025-01-20"), now).unwrap();

    let mut renamed = january_stay();
    renamed.summary = "Family weekend".to_string();
    reservations::upsert(&mut conn, &renamed, ts("2025-01-21T08:00:00Z")).unwrap();

    let stored = reservations::find(&conn, "r1").unwrap().unwrap();
    assert_eq!(stored.summary, "Family weekend");
    assert!(stored.check_in.is_some());
    assert!(stored.check_out.is_some());
}

#[test]
fn test_unreadable_reservation_does_not_abort_the_pass() {
    let mut conn = open_db("reconcile_unreadable_row");
    let now = ts("2025-01-20T08:00:00Z");

    reservations::upsert(&mut conn, &january_stay(), now).unwrap();
    reservations::upsert(
        &mut conn,
        &reservation("broken", "2025-01-02T10:00:00Z", "2025-01-04T10:00:00Z"),
        now,
    )
    .unwrap();
    conn.execute(
        "UPDATE reservations
            SET check_in_time = '2025-01-02T10:00:00.000Z',
                check_in_source = 'BOGUS',
                check_in_source_id = 'x'
          WHERE id = 'broken'",
        [],
    )
    .unwrap();

    let report = run_pass(&mut conn, utc(), day("2025-01-20"), now).unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.updated, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "broken");

    let stored = reservations::find(&conn, "r1").unwrap().unwrap();
    assert_eq!(stored.check_in.unwrap().source, EvidenceSource::CalendarReservation);
}
