//! Validate a manifest without executing anything.

use std::path::Path;

use anyhow::{Context, Result};
use kiln_core::Reporter;
use kiln_schema::PackageDescriptor;

use crate::ui::ConsoleReporter;

/// Parse and validate the manifest, printing a short summary.
pub fn check(manifest: &Path) -> Result<()> {
    let content = std::fs::read_to_string(manifest)
        .with_context(|| format!("Failed to read manifest {}", manifest.display()))?;
    let desc = PackageDescriptor::parse(&content).context("Failed to parse manifest")?;
    kiln_core::validate(&desc).context("Manifest failed validation")?;

    let reporter = ConsoleReporter::new(false);
    reporter.success("Manifest is valid");
    println!("  Name: {}", desc.package.name);
    if !desc.package.description.is_empty() {
        println!("  Description: {}", desc.package.description);
    }
    println!("  Source: {}", desc.source.location());
    let specs = desc.dependencies.specs();
    if specs.is_empty() {
        println!("  Dependencies: none");
    } else {
        println!("  Dependencies:");
        for spec in &specs {
            println!("    {} ({})", spec.name, spec.stage);
        }
    }
    println!("  Install steps: {}", desc.install.len());
    if desc.test.is_none() {
        reporter.warning("No [test] section; installs will be unverified");
    }

    Ok(())
}
