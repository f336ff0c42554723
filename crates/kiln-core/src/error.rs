//! Domain-specific errors for orchestration operations
//!
//! Step failures and test failures are deliberately *not* here: they are
//! structured data inside [`crate::ExecutionResult`] and
//! [`crate::TestOutcome`] so the caller always receives the per-step log.
//! This enum covers the failures that prevent any step from running.

use kiln_schema::{ManifestError, PackageName};
use thiserror::Error;

/// Failures surfaced before or between external process invocations.
#[derive(Error, Debug)]
pub enum OrchestrateError {
    /// The descriptor is structurally invalid; surfaced before any
    /// external process runs.
    #[error("Invalid manifest: {0}")]
    Manifest(#[from] ManifestError),

    /// A build-time dependency was reported unsatisfied by the resolver.
    /// No install step has executed.
    #[error("Build dependency '{0}' is not satisfied")]
    DependencyMissing(PackageName),

    /// The external dependency resolver itself failed while checking a name.
    #[error("Dependency resolver failed on '{name}': {message}")]
    Resolver {
        /// The dependency being checked when the resolver failed.
        name: PackageName,
        /// The resolver's error, stringified at the capability boundary.
        message: String,
    },

    /// A step's command could not be spawned at all (e.g. not on `$PATH`).
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        /// The rendered command that could not be started.
        command: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error outside of process spawning (log files, workdirs).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
