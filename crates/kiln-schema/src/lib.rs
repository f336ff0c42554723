//! Descriptor schema for kiln.
//!
//! A kiln manifest (`<package>.toml`) declares a native tool's identity,
//! its build-time and runtime dependencies, and an ordered install/verify
//! procedure. This crate holds the pure data model and its TOML parsing;
//! it never touches the filesystem beyond reading a manifest and never
//! spawns a process.

pub mod descriptor;
pub mod types;

// Re-exports
pub use descriptor::{BuildStep, Dependencies, PackageDescriptor, PackageInfo, TestSpec};
pub use types::{DependencySpec, ManifestError, PackageName, SourceSpec, Stage};
