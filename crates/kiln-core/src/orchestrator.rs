//! Build orchestration: execute the install procedure to completion or
//! first failure.
//!
//! Steps run strictly in declared order, each as an isolated external
//! process the orchestrator blocks on. A non-zero exit, a kill by signal,
//! or a per-step timeout halts the sequence; later steps are never
//! attempted. The caller always gets the full per-step log back, whether
//! the run succeeded or not.
//!
//! The orchestrator is deterministic: the same descriptor and config
//! always produce the same rendered command sequence (see [`Orchestrator::plan`]).
//! It does not roll back partially completed native installs; cleanup on
//! partial failure is the toolchain's concern.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;

use kiln_schema::{ManifestError, PackageDescriptor, PackageName};
use tokio::process::Command;

use crate::config::BuildConfig;
use crate::error::OrchestrateError;
use crate::placeholder;
use crate::reporter::Reporter;
use crate::resolver::{DependencyResolver, check_build_deps};
use crate::validate::validate;

/// Why a step stopped the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCause {
    /// The process terminated with a non-zero exit code.
    Exited(i32),
    /// The process was terminated by a signal (external cancellation).
    Signaled,
    /// The per-step timeout elapsed and the process was killed.
    TimedOut,
}

impl std::fmt::Display for StepCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with code {code}"),
            Self::Signaled => write!(f, "terminated by signal"),
            Self::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Outcome of one executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The process exited zero.
    Succeeded,
    /// The process failed; the sequence halted here.
    Failed(StepCause),
}

/// Captured record of one executed install step.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// 1-based position in the install procedure.
    pub index: usize,
    /// The rendered program that was invoked.
    pub command: String,
    /// The rendered argument list.
    pub args: Vec<String>,
    /// The working directory the step ran in.
    pub workdir: PathBuf,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the step succeeded or halted the sequence.
    pub status: StepStatus,
}

impl StepRecord {
    /// The step as a single display line (`command arg arg ...`).
    pub fn display_line(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Final status of an orchestration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every install step exited zero.
    Success,
    /// A step failed; no later step was attempted.
    Failed {
        /// 1-based index of the failing step.
        step: usize,
        /// The failing step's rendered command line.
        command: String,
        /// Why the step failed.
        cause: StepCause,
    },
}

/// Result of one orchestration run: created at start, mutated only by the
/// orchestrator, immutable once returned.
#[derive(Debug)]
pub struct ExecutionResult {
    /// The package this run belongs to.
    pub package: PackageName,
    /// Final status.
    pub status: RunStatus,
    /// Ordered log of every step that ran, identical in order to the
    /// declared sequence. On failure its length is the failing index.
    pub steps: Vec<StepRecord>,
    /// Runtime dependencies recorded for the installed artifact's sake;
    /// never gated on during orchestration.
    pub runtime_deps: Vec<PackageName>,
    /// Installed artifact paths (`prefix`, `bin`). Empty unless the run
    /// succeeded.
    pub artifacts: BTreeMap<String, PathBuf>,
}

impl ExecutionResult {
    /// Whether every step exited zero.
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// 1-based index of the failing step, if any.
    pub fn failing_step(&self) -> Option<usize> {
        match self.status {
            RunStatus::Success => None,
            RunStatus::Failed { step, .. } => Some(step),
        }
    }
}

/// A step after placeholder resolution, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStep {
    /// 1-based position in the install procedure.
    pub index: usize,
    /// Resolved program to invoke.
    pub command: String,
    /// Resolved argument list.
    pub args: Vec<String>,
    /// Effective working directory.
    pub workdir: PathBuf,
}

impl RenderedStep {
    /// The step as a single display line.
    pub fn display_line(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Executes one package's install procedure against a build configuration.
///
/// Exclusively owns its run's working state; independent orchestrator
/// instances may run concurrently without shared mutable state.
#[derive(Debug)]
pub struct Orchestrator {
    config: BuildConfig,
    source_dir: PathBuf,
}

impl Orchestrator {
    /// Create an orchestrator running steps under `source_dir` (the
    /// package's source tree root) with the given configuration.
    pub fn new(config: BuildConfig, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            source_dir: source_dir.into(),
        }
    }

    /// The build configuration this orchestrator resolves placeholders
    /// against.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Validate the descriptor and render the full command sequence
    /// without executing anything.
    ///
    /// Two calls with the same descriptor and config return identical
    /// plans; this is the deterministic sequence [`run`](Self::run)
    /// executes.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] if the descriptor fails validation.
    pub fn plan(&self, desc: &PackageDescriptor) -> Result<Vec<RenderedStep>, ManifestError> {
        validate(desc)?;
        Ok(self.render(desc))
    }

    /// Render every step against the config, chaining working
    /// directories. Only call after validation.
    fn render(&self, desc: &PackageDescriptor) -> Vec<RenderedStep> {
        let mut workdir = self.source_dir.clone();
        desc.install
            .iter()
            .enumerate()
            .map(|(i, step)| {
                if let Some(dir) = &step.workdir {
                    let rendered = placeholder::render_inline(&dir.to_string_lossy(), &self.config);
                    // An absolute override (e.g. one rooted at {{prefix}})
                    // replaces the source dir instead of nesting under it.
                    workdir = self.source_dir.join(rendered);
                }
                RenderedStep {
                    index: i + 1,
                    command: placeholder::render_inline(&step.command, &self.config),
                    args: placeholder::render_args(&step.args, &self.config),
                    workdir: workdir.clone(),
                }
            })
            .collect()
    }

    /// Run the full lifecycle up to (not including) the smoke test:
    /// validate, gate on build dependencies, then execute every step in
    /// order until completion or first failure.
    ///
    /// A failing step is *not* an `Err`: the caller receives
    /// `Ok(ExecutionResult)` with `RunStatus::Failed` and the captured
    /// per-step log. `Err` means no conclusion was reached: invalid
    /// manifest, missing build dependency (no step has run), resolver
    /// breakdown, or a command that could not be spawned at all.
    pub async fn run<R: Reporter + ?Sized>(
        &self,
        desc: &PackageDescriptor,
        resolver: &dyn DependencyResolver,
        reporter: &R,
    ) -> Result<ExecutionResult, OrchestrateError> {
        let plan = self.plan(desc)?;
        let total = plan.len();

        reporter.section("Checking build dependencies");
        check_build_deps(desc, resolver).await?;

        tokio::fs::create_dir_all(&self.config.prefix).await?;

        reporter.section("Building");
        let mut steps: Vec<StepRecord> = Vec::with_capacity(total);
        let mut status = RunStatus::Success;

        for rendered in plan {
            reporter.step_started(rendered.index, total, &rendered.display_line());
            tracing::info!(
                step = rendered.index,
                command = %rendered.display_line(),
                workdir = %rendered.workdir.display(),
                "running install step"
            );

            let record = self.execute_step(&rendered).await?;
            let failed = match record.status {
                StepStatus::Succeeded => {
                    reporter.step_finished(rendered.index, total);
                    None
                }
                StepStatus::Failed(cause) => {
                    reporter.step_failed(rendered.index, &cause.to_string());
                    Some(cause)
                }
            };
            steps.push(record);

            if let Some(cause) = failed {
                status = RunStatus::Failed {
                    step: rendered.index,
                    command: rendered.display_line(),
                    cause,
                };
                break;
            }
        }

        let mut artifacts = BTreeMap::new();
        if status == RunStatus::Success {
            artifacts.insert("prefix".to_string(), self.config.prefix.clone());
            artifacts.insert("bin".to_string(), self.config.bin_dir());
        }

        Ok(ExecutionResult {
            package: desc.package.name.clone(),
            status,
            steps,
            runtime_deps: desc.runtime_deps().to_vec(),
            artifacts,
        })
    }

    /// Spawn one rendered step and wait for it under the configured
    /// timeout, capturing output.
    async fn execute_step(&self, rendered: &RenderedStep) -> Result<StepRecord, OrchestrateError> {
        let mut command = Command::new(&rendered.command);
        command
            .args(&rendered.args)
            .current_dir(&rendered.workdir)
            .env("PREFIX", &self.config.prefix)
            .env("JOBS", self.config.jobs.to_string())
            .stdin(Stdio::null())
            // Cancellation path: dropping the in-flight future on timeout
            // must terminate the external process.
            .kill_on_drop(true);

        let waited = match self.config.step_timeout {
            Some(limit) => tokio::time::timeout(limit, command.output()).await.ok(),
            None => Some(command.output().await),
        };

        let Some(spawned) = waited else {
            tracing::warn!(step = rendered.index, "step exceeded timeout, killed");
            return Ok(StepRecord {
                index: rendered.index,
                command: rendered.command.clone(),
                args: rendered.args.clone(),
                workdir: rendered.workdir.clone(),
                stdout: String::new(),
                stderr: String::new(),
                status: StepStatus::Failed(StepCause::TimedOut),
            });
        };

        let output = spawned.map_err(|source| OrchestrateError::Spawn {
            command: rendered.command.clone(),
            source,
        })?;

        let status = if output.status.success() {
            StepStatus::Succeeded
        } else {
            // A killed process reports no exit code; treat it exactly
            // like a non-zero exit, with a distinct cause.
            StepStatus::Failed(match output.status.code() {
                Some(code) => StepCause::Exited(code),
                None => StepCause::Signaled,
            })
        };

        Ok(StepRecord {
            index: rendered.index,
            command: rendered.command.clone(),
            args: rendered.args.clone(),
            workdir: rendered.workdir.clone(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status,
        })
    }
}
