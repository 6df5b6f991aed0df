use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

/// Row counts of the entity tables.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TableCounts {
    pub reservations: i64,
    pub reconciled: i64,
    pub vehicle_trips: i64,
    pub presence_readings: i64,
    pub checkpoints: i64,
}

pub fn table_counts(pool: &DbPool) -> rusqlite::Result<TableCounts> {
    let count = |sql: &str| -> rusqlite::Result<i64> { pool.conn.query_row(sql, [], |row| row.get(0)) };

    Ok(TableCounts {
        reservations: count("SELECT COUNT(*) FROM reservations")?,
        reconciled: count("SELECT COUNT(*) FROM reservations WHERE check_in_time IS NOT NULL")?,
        vehicle_trips: count("SELECT COUNT(*) FROM vehicle_trips")?,
        presence_readings: count("SELECT COUNT(*) FROM presence_readings")?,
        checkpoints: count("SELECT COUNT(*) FROM sync_checkpoints")?,
    })
}

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) TOTALS
    //
    let counts = table_counts(pool)?;
    println!(
        "{}• Reservations:{} {}{}{} ({} reconciled)",
        CYAN, RESET, GREEN, counts.reservations, RESET, counts.reconciled
    );
    println!(
        "{}• Vehicle trips:{} {}{}{}",
        CYAN, RESET, GREEN, counts.vehicle_trips, RESET
    );
    println!(
        "{}• Presence readings:{} {}{}{}",
        CYAN, RESET, GREEN, counts.presence_readings, RESET
    );
    println!(
        "{}• Checkpoints:{} {}{}{}",
        CYAN, RESET, GREEN, counts.checkpoints, RESET
    );

    //
    // 3) RESERVATION RANGE
    //
    let first: Option<String> = pool
        .conn
        .query_row(
            "SELECT start_time FROM reservations ORDER BY start_time ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let last: Option<String> = pool
        .conn
        .query_row(
            "SELECT end_time FROM reservations ORDER BY end_time DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let fmt_first = first.unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Reservation range:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    println!();
    Ok(())
}
