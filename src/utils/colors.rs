//! ANSI escapes for table cells and log lines.

pub const RESET: &str = "\x1b[0m";
pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";

fn is_placeholder(value: &str) -> bool {
    matches!(value.trim(), "" | "--")
}

fn paint(color: &str, value: &str) -> String {
    format!("{color}{value}{RESET}")
}

/// Grey placeholder for an empty cell, the value itself otherwise.
pub fn colorize_optional(value: &str) -> String {
    if is_placeholder(value) {
        paint(GREY, value)
    } else {
        value.to_string()
    }
}

/// Green for a check-in, red for a check-out.
pub fn colorize_in_out(value: &str, is_in: bool) -> String {
    match (is_placeholder(value), is_in) {
        (true, _) => paint(GREY, value),
        (false, true) => paint(GREEN, value),
        (false, false) => paint(RED, value),
    }
}
