//! Reservation table for the `list` command.

use crate::models::{CheckEvent, ReferenceZone, Reservation};
use crate::utils::colors::{RESET, colorize_in_out, colorize_optional};
use crate::utils::formatting::describe_source;
use crate::utils::format_duration;
use crate::utils::table::Table;

const DATE_FMT: &str = "%Y-%m-%d %H:%M";

fn event_cell(event: Option<&CheckEvent>, is_in: bool, zone: ReferenceZone) -> String {
    match event {
        Some(e) => colorize_in_out(
            &e.time.with_timezone(&zone.offset()).format(DATE_FMT).to_string(),
            is_in,
        ),
        None => colorize_optional("--"),
    }
}

fn source_cell(event: Option<&CheckEvent>) -> String {
    match event {
        Some(e) => {
            let (label, color) = describe_source(e.source);
            format!("{color}{label}{RESET}")
        }
        None => colorize_optional("--"),
    }
}

pub fn reservation_table(reservations: &[Reservation], zone: ReferenceZone) -> Table {
    let mut table = Table::new(&[
        "ID", "Start", "End", "Guests", "Check-in", "Src", "Check-out", "Src", "Stay",
    ]);

    for r in reservations {
        table.add_row(vec![
            r.id.clone(),
            r.start.with_timezone(&zone.offset()).format(DATE_FMT).to_string(),
            r.end.with_timezone(&zone.offset()).format(DATE_FMT).to_string(),
            r.guest_ids.len().to_string(),
            event_cell(r.check_in.as_ref(), true, zone),
            source_cell(r.check_in.as_ref()),
            event_cell(r.check_out.as_ref(), false, zone),
            source_cell(r.check_out.as_ref()),
            r.duration()
                .map(format_duration)
                .unwrap_or_else(|| colorize_optional("--")),
        ]);
    }

    table
}
