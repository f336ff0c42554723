//! Subcommand implementations.

pub mod check;
pub mod install;

use kiln_core::BuildConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Assemble a [`BuildConfig`] from CLI options, falling back to the
/// default layout under `~/.kiln`.
pub(crate) fn build_config(
    prefix: Option<PathBuf>,
    build_flags: Vec<String>,
    timeout: Option<u64>,
) -> BuildConfig {
    let mut config = match prefix {
        Some(p) => BuildConfig::with_prefix(p),
        None => BuildConfig::default(),
    };
    config.build_flags = build_flags;
    config.step_timeout = timeout.map(Duration::from_secs);
    config
}

/// The directory install steps start in: the manifest's parent, or the
/// current directory when the manifest path has none.
pub(crate) fn source_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
