//! cabinlog main entrypoint.

use cabinlog::run;
use cabinlog::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {e}"));
        std::process::exit(1);
    }
}
