//! Filesystem layout for kiln state (`~/.kiln`).

use dirs::home_dir;
use std::path::PathBuf;

/// Returns the primary kiln directory, or None if the user's home cannot be resolved.
pub fn try_kiln_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("KILN_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".kiln"))
}

/// Returns the canonical kiln home directory (`~/.kiln`).
///
/// # Panics
///
/// Panics if neither `KILN_HOME` is set nor the user's home directory can
/// be resolved. On a normal system this should never happen.
pub fn kiln_home() -> PathBuf {
    try_kiln_home().expect("Could not determine home directory. Set KILN_HOME to override.")
}

/// Default install prefix: ~/.kiln/prefix
pub fn default_prefix() -> PathBuf {
    kiln_home().join("prefix")
}

/// Logs directory: ~/.kiln/logs
pub fn log_dir() -> PathBuf {
    kiln_home().join("logs")
}

/// Generate a build log path for a package
pub fn build_log_path(package: &str) -> PathBuf {
    let timestamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    log_dir().join(format!("build-{package}-{timestamp}.log"))
}
