//! The install operation: validate, gate, build, then verify.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kiln_core::{
    ExecutionResult, Orchestrator, PathResolver, Reporter, RunStatus, SmokeTestRunner, TestOutcome,
};
use kiln_schema::PackageDescriptor;

use crate::ui::ConsoleReporter;

/// Run the full lifecycle for the manifest at `manifest`.
///
/// Exit semantics: `Ok` only when the package is installed *and* (if a
/// test spec exists) verified. A build failure, a missing dependency, and
/// a failed verification all surface as errors, but verification failure
/// is reported as "installed, unverified" first.
pub async fn install(
    manifest: &Path,
    prefix: Option<PathBuf>,
    build_flags: Vec<String>,
    timeout: Option<u64>,
    verbose: bool,
    dry_run: bool,
) -> Result<()> {
    let desc = PackageDescriptor::from_file(manifest)
        .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;
    tracing::debug!(package = %desc.package.name, manifest = %manifest.display(), "loaded descriptor");

    let config = super::build_config(prefix, build_flags, timeout);
    let orchestrator = Orchestrator::new(config.clone(), super::source_dir(manifest));

    if dry_run {
        for step in orchestrator.plan(&desc)? {
            println!("[{}] {}", step.index, step.display_line());
        }
        return Ok(());
    }

    let reporter = ConsoleReporter::new(verbose);
    reporter.section(&format!(
        "Installing {} ({})",
        desc.package.name,
        desc.source.location()
    ));

    let result = orchestrator.run(&desc, &PathResolver, &reporter).await?;

    let log_path = write_build_log(&desc.package.name, &result)
        .with_context(|| "Failed to write build log")?;
    if verbose {
        echo_captured(&result);
    }

    match &result.status {
        RunStatus::Failed {
            step,
            command,
            cause,
        } => {
            if !verbose {
                if let Ok(tail) = read_last_lines(&log_path, 20) {
                    eprintln!("\nBuild failed. Last 20 lines:");
                    eprintln!("{tail}");
                }
                eprintln!("\nFull log: {}", log_path.display());
            }
            anyhow::bail!("Build failed at step {step} ({command}): {cause}");
        }
        RunStatus::Success => {
            reporter.success(&format!(
                "Installed {} to {}",
                desc.package.name,
                orchestrator.config().prefix.display()
            ));
        }
    }

    if desc.test.is_none() {
        reporter.warning("No [test] section; install is unverified");
        return Ok(());
    }

    match SmokeTestRunner::new(config).run(&desc, &reporter).await? {
        TestOutcome::Passed { .. } => {
            reporter.success(&format!("Verified {}", desc.package.name));
            Ok(())
        }
        TestOutcome::Failed {
            cause,
            stdout,
            stderr,
        } => {
            if !stdout.is_empty() {
                eprintln!("{stdout}");
            }
            if !stderr.is_empty() {
                eprintln!("{stderr}");
            }
            reporter.warning(&format!(
                "{} installed but unverified: test {cause}",
                desc.package.name
            ));
            anyhow::bail!("Smoke test failed: {cause}");
        }
    }
}

/// Persist every captured step's output to a timestamped log file.
fn write_build_log(package: &str, result: &ExecutionResult) -> Result<PathBuf> {
    use std::io::Write;

    let path = kiln_core::build_log_path(package);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(&path)?;
    for record in &result.steps {
        writeln!(file, "$ {}", record.display_line())?;
        if !record.stdout.is_empty() {
            writeln!(file, "{}", record.stdout.trim_end())?;
        }
        if !record.stderr.is_empty() {
            writeln!(file, "{}", record.stderr.trim_end())?;
        }
    }
    Ok(path)
}

/// Print captured output for every executed step (verbose mode).
fn echo_captured(result: &ExecutionResult) {
    for record in &result.steps {
        if !record.stdout.is_empty() {
            print!("{}", record.stdout);
        }
        if !record.stderr.is_empty() {
            eprint!("{}", record.stderr);
        }
    }
}

/// Read the last N lines from a file efficiently.
///
/// Seeks to near the end and reads a fixed-size tail buffer instead of
/// loading the entire file, so huge build logs stay cheap to summarize.
fn read_last_lines(path: &Path, n: usize) -> Result<String> {
    use std::fs::File;
    use std::io::{Read, Seek, SeekFrom};

    // 16KB is enough for ~400 lines at 40 chars each
    const TAIL_SIZE: u64 = 16 * 1024;

    let mut file = File::open(path)?;
    let file_len = file.metadata()?.len();

    let seek_pos = file_len.saturating_sub(TAIL_SIZE);
    file.seek(SeekFrom::Start(seek_pos))?;

    let mut buffer = String::new();
    file.read_to_string(&mut buffer)?;

    // If we seeked mid-file, skip the first (partial) line in-place
    let content = if seek_pos > 0 {
        buffer
            .find('\n')
            .map_or(buffer.as_str(), |idx| &buffer[idx + 1..])
    } else {
        &buffer
    };

    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].join("\n"))
}
