//! End-to-end lifecycle tests: validate -> gate -> orchestrate -> verify.
//!
//! Uses `sh` as the external toolchain so every scenario runs hermetically
//! inside a tempdir.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use kiln_core::{
    BuildConfig, DependencyResolver, NullReporter, OrchestrateError, Orchestrator, RunStatus,
    SmokeTestRunner, StepCause, StepStatus, TestOutcome,
};
use kiln_schema::{PackageDescriptor, PackageName};
use tempfile::TempDir;

/// Resolver satisfied by an explicit allow-list; records nothing.
struct StaticResolver(HashSet<String>);

impl StaticResolver {
    fn satisfying(names: &[&str]) -> Self {
        Self(names.iter().map(ToString::to_string).collect())
    }
}

#[async_trait]
impl DependencyResolver for StaticResolver {
    async fn is_satisfied(&self, name: &PackageName) -> Result<bool> {
        Ok(self.0.contains(name.as_str()))
    }
}

struct Harness {
    source: TempDir,
    config: BuildConfig,
}

impl Harness {
    fn new() -> Self {
        let source = TempDir::new().expect("failed to create source dir");
        let prefix = source.path().join("prefix");
        Self {
            source,
            config: BuildConfig::with_prefix(prefix),
        }
    }

    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.config.clone(), self.source.path())
    }

    fn parse(&self, manifest: &str) -> PackageDescriptor {
        PackageDescriptor::parse(manifest).expect("manifest should parse")
    }
}

const HEADER: &str = r#"
[package]
name = "demo"

[source]
git = "https://example.com/demo.git"
"#;

fn manifest(body: &str) -> String {
    format!("{HEADER}\n{body}")
}

// Scenario: configure -> build -> install all succeed, test succeeds.
#[tokio::test]
async fn full_lifecycle_success() {
    let h = Harness::new();
    let desc = h.parse(&manifest(
        r#"
[[install]]
command = "sh"
args = ["-c", "echo configured"]

[[install]]
command = "sh"
args = ["-c", "echo built"]

[[install]]
command = "sh"
args = ["-c", "mkdir -p {{bin}} && touch {{bin}}/demo"]

[test]
command = "sh"
args = ["-c", "test -f {{bin}}/demo"]
"#,
    ));

    let result = h
        .orchestrator()
        .run(&desc, &StaticResolver::satisfying(&[]), &NullReporter)
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.steps.len(), 3);
    assert!(
        result
            .steps
            .iter()
            .all(|s| s.status == StepStatus::Succeeded)
    );
    assert_eq!(result.artifacts["bin"], h.config.bin_dir());
    assert_eq!(result.artifacts["prefix"], h.config.prefix);

    // Smoke test only after success.
    let outcome = SmokeTestRunner::new(h.config.clone())
        .run(&desc, &NullReporter)
        .await
        .unwrap();
    assert!(outcome.is_passed());
}

// Scenario: the middle step fails; the install step never runs.
#[tokio::test]
async fn failure_halts_the_sequence() {
    let h = Harness::new();
    let marker = h.source.path().join("install-ran");
    let desc = h.parse(&manifest(&format!(
        r#"
[[install]]
command = "sh"
args = ["-c", "echo configured"]

[[install]]
command = "sh"
args = ["-c", "echo failing >&2; exit 1"]

[[install]]
command = "sh"
args = ["-c", "touch {}"]
"#,
        marker.display()
    )));

    let result = h
        .orchestrator()
        .run(&desc, &StaticResolver::satisfying(&[]), &NullReporter)
        .await
        .unwrap();

    assert_eq!(result.failing_step(), Some(2));
    assert_eq!(result.steps.len(), 2);
    match &result.status {
        RunStatus::Failed { step, cause, .. } => {
            assert_eq!(*step, 2);
            assert_eq!(*cause, StepCause::Exited(1));
        }
        RunStatus::Success => panic!("expected failure"),
    }
    assert!(result.steps[1].stderr.contains("failing"));
    assert!(result.artifacts.is_empty());
    assert!(!marker.exists(), "later step must never run");
}

// Scenario: a build-time dependency is unsatisfied; nothing executes.
#[tokio::test]
async fn missing_build_dependency_aborts_before_any_step() {
    let h = Harness::new();
    let marker = h.source.path().join("configure-ran");
    let desc = h.parse(&manifest(&format!(
        r#"
[dependencies]
build = ["json-c"]

[[install]]
command = "sh"
args = ["-c", "touch {}"]
"#,
        marker.display()
    )));

    let err = h
        .orchestrator()
        .run(&desc, &StaticResolver::satisfying(&[]), &NullReporter)
        .await
        .unwrap_err();

    match err {
        OrchestrateError::DependencyMissing(name) => assert_eq!(name, "json-c"),
        other => panic!("expected DependencyMissing, got {other:?}"),
    }
    assert!(!marker.exists(), "no step may run when the gate fails");
}

// Scenario: install succeeds, verification fails; the two states stay
// distinct.
#[tokio::test]
async fn test_failure_leaves_install_success_standing() {
    let h = Harness::new();
    let desc = h.parse(&manifest(
        r#"
[[install]]
command = "sh"
args = ["-c", "echo installed"]

[test]
command = "sh"
args = ["-c", "exit 1"]
"#,
    ));

    let result = h
        .orchestrator()
        .run(&desc, &StaticResolver::satisfying(&[]), &NullReporter)
        .await
        .unwrap();
    assert_eq!(result.status, RunStatus::Success);

    let outcome = SmokeTestRunner::new(h.config.clone())
        .run(&desc, &NullReporter)
        .await
        .unwrap();
    match outcome {
        TestOutcome::Failed { cause, .. } => assert_eq!(cause, StepCause::Exited(1)),
        TestOutcome::Passed { .. } => panic!("expected test failure"),
    }
}

// Runtime dependencies are recorded in the result but never gated on.
#[tokio::test]
async fn runtime_dependencies_are_recorded_not_gated() {
    let h = Harness::new();
    let desc = h.parse(&manifest(
        r#"
[dependencies]
build = ["cmake"]
runtime = ["json-c", "libxml2"]

[[install]]
command = "sh"
args = ["-c", "true"]
"#,
    ));

    // Resolver only knows the build dep; runtime deps would fail if queried.
    let result = h
        .orchestrator()
        .run(&desc, &StaticResolver::satisfying(&["cmake"]), &NullReporter)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(
        result.runtime_deps,
        vec![PackageName::from("json-c"), PackageName::from("libxml2")]
    );
}

// The rendered command sequence is identical across runs.
#[tokio::test]
async fn command_sequence_is_deterministic() {
    let h = Harness::new();
    let desc = h.parse(&manifest(
        r#"
[[install]]
command = "cmake"
args = ["-S", ".", "-B", "build", "{{std_flags}}"]

[[install]]
command = "cmake"
args = ["--build", "build", "-j", "{{jobs}}"]
"#,
    ));

    let orch = h.orchestrator();
    let first = orch.plan(&desc).unwrap();
    let second = orch.plan(&desc).unwrap();
    assert_eq!(first, second);

    // And a second orchestrator with the same config agrees.
    let third = h.orchestrator().plan(&desc).unwrap();
    assert_eq!(first, third);
}

// A step exceeding the configured timeout is cancelled and treated as a
// failure; later steps never run.
#[tokio::test]
async fn timeout_cancels_the_step_and_halts() {
    let mut h = Harness::new();
    h.config.step_timeout = Some(Duration::from_millis(200));
    let marker = h.source.path().join("after-timeout");
    let desc = h.parse(&manifest(&format!(
        r#"
[[install]]
command = "sleep"
args = ["30"]

[[install]]
command = "sh"
args = ["-c", "touch {}"]
"#,
        marker.display()
    )));

    let result = h
        .orchestrator()
        .run(&desc, &StaticResolver::satisfying(&[]), &NullReporter)
        .await
        .unwrap();

    match &result.status {
        RunStatus::Failed { step, cause, .. } => {
            assert_eq!(*step, 1);
            assert_eq!(*cause, StepCause::TimedOut);
        }
        RunStatus::Success => panic!("expected timeout failure"),
    }
    assert_eq!(result.steps.len(), 1);
    assert!(!marker.exists());
}

// Steps chain working directories: an override sticks for later steps.
#[tokio::test]
async fn workdir_overrides_chain_forward() {
    let h = Harness::new();
    std::fs::create_dir_all(h.source.path().join("build")).unwrap();
    let desc = h.parse(&manifest(
        r#"
[[install]]
command = "sh"
args = ["-c", "touch first"]
workdir = "build"

[[install]]
command = "sh"
args = ["-c", "touch second"]
"#,
    ));

    let result = h
        .orchestrator()
        .run(&desc, &StaticResolver::satisfying(&[]), &NullReporter)
        .await
        .unwrap();

    assert!(result.is_success());
    assert!(h.source.path().join("build/first").exists());
    assert!(h.source.path().join("build/second").exists());
}

// An invalid manifest never reaches the resolver or spawns a process.
#[tokio::test]
async fn validation_precedes_the_dependency_gate() {
    struct PanicResolver;

    #[async_trait]
    impl DependencyResolver for PanicResolver {
        async fn is_satisfied(&self, _: &PackageName) -> Result<bool> {
            panic!("resolver must not be queried for an invalid manifest");
        }
    }

    let h = Harness::new();
    let desc = h.parse(&manifest(
        r#"
[dependencies]
build = ["cmake"]

[[install]]
command = "sh"
args = ["{{not_a_placeholder}}"]
"#,
    ));

    let err = h
        .orchestrator()
        .run(&desc, &PanicResolver, &NullReporter)
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestrateError::Manifest(_)));
}
