//! kiln-core - build orchestration and verification lifecycle.
//!
//! Given a validated [`kiln_schema::PackageDescriptor`], this crate drives
//! an external build toolchain through the package's install procedure and
//! post-install smoke test, reporting success or the exact failure point.
//!
//! # Lifecycle
//!
//! ```text
//! validate -> dependency gate -> step 1 -> step 2 -> ... -> step N -> smoke test
//! ```
//!
//! Each arrow is a hard gate: a structurally invalid descriptor never
//! reaches the resolver, an unsatisfied build dependency means no step
//! runs, a failing step halts the sequence, and the smoke test only runs
//! against a fully successful install.
//!
//! Dependency *resolution* is out of scope. The orchestrator only checks
//! satisfaction through the [`DependencyResolver`] capability; locating and
//! installing dependencies is the caller's concern.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod paths;
pub mod placeholder;
pub mod reporter;
pub mod resolver;
pub mod smoke;
pub mod validate;

pub use config::BuildConfig;
pub use error::OrchestrateError;
pub use orchestrator::{
    ExecutionResult, Orchestrator, RenderedStep, RunStatus, StepCause, StepRecord, StepStatus,
};
pub use paths::*;
pub use reporter::{NullReporter, Reporter};
pub use resolver::{DependencyResolver, PathResolver};
pub use smoke::{SmokeTestRunner, TestOutcome};
pub use validate::validate;
