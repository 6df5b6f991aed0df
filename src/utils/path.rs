//! Path utilities: expand `~` in configured paths.

use std::path::PathBuf;

/// `~` and `~/...` resolve against the home directory; anything else is
/// returned as given.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}
