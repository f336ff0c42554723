//! Post-install smoke test: the acceptance gate distinguishing "files
//! copied to disk" from "tool actually runs".
//!
//! The runner substitutes the installed artifact paths into the test
//! command and executes it in a scratch directory, the way an end user
//! would invoke the freshly installed tool. A failing test does not undo
//! the install; it marks it *unverified*, a deliberately distinct state.

use std::process::Stdio;

use kiln_schema::{ManifestError, PackageDescriptor};
use tokio::process::Command;

use crate::config::BuildConfig;
use crate::error::OrchestrateError;
use crate::orchestrator::StepCause;
use crate::placeholder;
use crate::reporter::Reporter;
use crate::validate::validate_test;

/// Verdict of the smoke test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    /// The verification command exited zero; the install is verified.
    Passed {
        /// Captured standard output of the verification command.
        stdout: String,
    },
    /// The verification command failed. The install stands but is
    /// unverified.
    Failed {
        /// Why the command failed.
        cause: StepCause,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
}

impl TestOutcome {
    /// Whether verification passed.
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }
}

/// Runs a descriptor's `[test]` command against an installed prefix.
#[derive(Debug)]
pub struct SmokeTestRunner {
    config: BuildConfig,
}

impl SmokeTestRunner {
    /// Create a runner resolving `{{bin}}`/`{{prefix}}` against the given
    /// configuration.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Execute the verification command.
    ///
    /// Only meaningful after a successful install; callers enforce that
    /// ordering. The command runs in a fresh scratch directory so a test
    /// that writes files cannot disturb the source tree or the prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::NoTestSpec`] (wrapped) if the descriptor
    /// has no `[test]` section, or [`OrchestrateError::Spawn`] if the
    /// command cannot be started. A command that runs and exits non-zero
    /// is `Ok(TestOutcome::Failed)`, not an error.
    pub async fn run<R: Reporter + ?Sized>(
        &self,
        desc: &PackageDescriptor,
        reporter: &R,
    ) -> Result<TestOutcome, OrchestrateError> {
        let test = desc
            .test
            .as_ref()
            .ok_or_else(|| ManifestError::NoTestSpec(desc.package.name.clone()))?;
        validate_test(test)?;

        let program = placeholder::render_inline(&test.command, &self.config);
        let args = placeholder::render_args(&test.args, &self.config);

        let scratch = tempfile::tempdir()?;
        reporter.section("Verifying");
        reporter.info(&format!("{} {}", program, args.join(" ")));
        tracing::info!(command = %program, "running smoke test");

        let mut command = Command::new(&program);
        command
            .args(&args)
            .current_dir(scratch.path())
            .env("PREFIX", &self.config.prefix)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let waited = match self.config.step_timeout {
            Some(limit) => tokio::time::timeout(limit, command.output()).await.ok(),
            None => Some(command.output().await),
        };

        let Some(spawned) = waited else {
            return Ok(TestOutcome::Failed {
                cause: StepCause::TimedOut,
                stdout: String::new(),
                stderr: String::new(),
            });
        };

        let output = spawned.map_err(|source| OrchestrateError::Spawn {
            command: program.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            Ok(TestOutcome::Passed { stdout })
        } else {
            let cause = match output.status.code() {
                Some(code) => StepCause::Exited(code),
                None => StepCause::Signaled,
            };
            Ok(TestOutcome::Failed {
                cause,
                stdout,
                stderr,
            })
        }
    }
}
