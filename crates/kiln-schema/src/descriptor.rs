//! TOML package descriptor parsing
//!
//! Human-readable, data-driven install procedures. A descriptor replaces
//! per-package imperative build scripts with an ordered list of structured
//! step commands interpreted uniformly by one orchestrator.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{DependencySpec, ManifestError, PackageName, SourceSpec, Stage};

/// Metadata describing a package's identity and provenance.
///
/// Everything here except `name` is cosmetic pass-through: recorded,
/// displayed, never interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Unique name that identifies this package.
    pub name: PackageName,
    /// Short human-readable summary of the package.
    #[serde(default)]
    pub description: String,
    /// URL of the project's homepage.
    #[serde(default)]
    pub homepage: String,
    /// SPDX license identifier for the package.
    #[serde(default)]
    pub license: String,
}

/// Dependency lists grouped by when they are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dependencies {
    /// Packages required only during the build phase.
    #[serde(default)]
    pub build: Vec<PackageName>,
    /// Packages required at runtime by the installed artifact.
    #[serde(default)]
    pub runtime: Vec<PackageName>,
}

impl Dependencies {
    /// Flatten both tables into typed specs with explicit stage tags.
    pub fn specs(&self) -> Vec<DependencySpec> {
        self.build
            .iter()
            .map(|n| DependencySpec::new(n.clone(), Stage::Build))
            .chain(
                self.runtime
                    .iter()
                    .map(|n| DependencySpec::new(n.clone(), Stage::Runtime)),
            )
            .collect()
    }
}

/// One ordered external-process invocation in the install procedure.
///
/// A step's sequence index is its position in the `[[install]]` array.
/// Arguments may contain placeholders (`{{prefix}}`, `{{std_flags}}`,
/// `{{jobs}}`, `{{bin}}`) resolved against the build configuration
/// just before the step runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStep {
    /// Program to invoke (looked up on `$PATH`).
    pub command: String,
    /// Argument list, possibly containing placeholders.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory override, relative to the source tree root.
    /// Defaults to the previous step's effective working directory.
    #[serde(default)]
    pub workdir: Option<PathBuf>,
}

impl BuildStep {
    /// Render the step as a single display line (`command arg arg ...`).
    pub fn display_line(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// The post-install verification command.
///
/// Distinguishes "files copied to disk" from "tool actually runs": the
/// command is expected to exercise the installed artifact, typically via
/// the `{{bin}}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSpec {
    /// Program to invoke; may itself contain a placeholder
    /// (e.g. `{{bin}}/cfrds`).
    pub command: String,
    /// Argument list, possibly containing placeholders.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Complete package descriptor: metadata, source reference, dependency
/// declarations, install procedure, and verification procedure.
///
/// Immutable once loaded. The install procedure must be non-empty; the
/// test spec, when present, runs only after the install procedure
/// completes successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Core metadata for the package.
    pub package: PackageInfo,
    /// Where the source code comes from (pass-through metadata).
    pub source: SourceSpec,
    /// Build-time and runtime dependency declarations.
    #[serde(default)]
    pub dependencies: Dependencies,
    /// Ordered install procedure (`[[install]]` array).
    #[serde(rename = "install", default)]
    pub install: Vec<BuildStep>,
    /// Optional post-install smoke test (`[test]` table).
    #[serde(default)]
    pub test: Option<TestSpec>,
}

impl PackageDescriptor {
    /// Parse a descriptor from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Io` if the file cannot be read, or
    /// `ManifestError::Parse` if the TOML content is invalid.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a descriptor from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Parse` if the TOML content does not match
    /// the descriptor schema.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize this descriptor to a pretty-printed TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `toml::ser::Error` if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Build-stage dependencies, in declaration order.
    pub fn build_deps(&self) -> &[PackageName] {
        &self.dependencies.build
    }

    /// Runtime dependencies, in declaration order.
    pub fn runtime_deps(&self) -> &[PackageName] {
        &self.dependencies.runtime
    }
}

impl std::str::FromStr for PackageDescriptor {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_DESCRIPTOR: &str = r#"
[package]
name = "cfrds"
description = "ColdFusion RDS protocol library and CLI"
homepage = "https://github.com/bokic/cfrds"
license = "MIT"

[source]
git = "https://github.com/bokic/cfrds.git"

[dependencies]
build = ["cmake", "pkg-config"]
runtime = ["json-c", "libxml2"]

[[install]]
command = "cmake"
args = ["-S", ".", "-B", "build", "{{std_flags}}"]

[[install]]
command = "cmake"
args = ["--build", "build"]

[[install]]
command = "cmake"
args = ["--install", "build"]

[test]
command = "{{bin}}/cfrds"
args = ["--version"]
"#;

    #[test]
    fn parse_full_descriptor() {
        let desc = PackageDescriptor::parse(EXAMPLE_DESCRIPTOR).unwrap();

        assert_eq!(desc.package.name, PackageName::from("cfrds"));
        assert_eq!(desc.package.license, "MIT");
        assert_eq!(desc.install.len(), 3);
        assert_eq!(desc.install[0].command, "cmake");
        assert_eq!(desc.build_deps().len(), 2);
        assert_eq!(desc.runtime_deps().len(), 2);
        assert!(desc.test.is_some());
    }

    #[test]
    fn dependency_specs_carry_stage_tags() {
        let desc = PackageDescriptor::parse(EXAMPLE_DESCRIPTOR).unwrap();
        let specs = desc.dependencies.specs();

        assert_eq!(specs.len(), 4);
        assert_eq!(specs[0], DependencySpec::new("cmake", Stage::Build));
        assert_eq!(specs[2], DependencySpec::new("json-c", Stage::Runtime));
    }

    #[test]
    fn missing_install_array_defaults_to_empty() {
        let minimal = r#"
[package]
name = "x"

[source]
git = "https://example.com/x.git"
"#;
        let desc = PackageDescriptor::parse(minimal).unwrap();
        assert!(desc.install.is_empty());
        assert!(desc.test.is_none());
    }

    #[test]
    fn parse_malformed_toml() {
        let result = PackageDescriptor::parse("this is not valid toml {{{");
        assert!(matches!(result, Err(ManifestError::Parse(_))));
    }

    #[test]
    fn step_display_line_joins_args() {
        let step = BuildStep {
            command: "cmake".into(),
            args: vec!["--build".into(), "build".into()],
            workdir: None,
        };
        assert_eq!(step.display_line(), "cmake --build build");
    }

    #[test]
    fn descriptor_round_trips_through_toml() {
        let desc = PackageDescriptor::parse(EXAMPLE_DESCRIPTOR).unwrap();
        let reparsed = PackageDescriptor::parse(&desc.to_toml().unwrap()).unwrap();
        assert_eq!(reparsed.install, desc.install);
        assert_eq!(reparsed.test, desc.test);
    }
}
