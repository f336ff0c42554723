//! kiln - declarative package-build orchestration
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! The `kiln` binary interprets a package manifest (metadata, dependency
//! declarations, ordered install procedure, smoke test) and drives the
//! external build toolchain through it: configure, compile, install,
//! verify. It reports exactly which phase and which step failed, and maps
//! every failure kind to a non-zero exit code.
//!
//! # Operations
//!
//! - `kiln install <manifest>` - validate, gate on build dependencies,
//!   execute the install procedure, then run the smoke test.
//! - `kiln test <manifest>` - run only the smoke test against an
//!   existing install.
//! - `kiln check <manifest>` - validate the manifest without running
//!   anything.

pub mod cmd;
pub mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "kiln")]
#[command(author, version, about = "kiln - build, install, and verify native tools")]
pub struct Cli {
    /// Show the resolved command sequence without executing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build, install, and verify a package from its manifest
    Install {
        /// Path to the package manifest (TOML)
        manifest: PathBuf,
        /// Install prefix; relative install paths resolve against this
        #[arg(long)]
        prefix: Option<PathBuf>,
        /// Extra flag appended to every {{std_flags}} expansion (repeatable)
        #[arg(long = "build-flag")]
        build_flags: Vec<String>,
        /// Per-step wall-clock limit in seconds before forced cancellation
        #[arg(long)]
        timeout: Option<u64>,
        /// Echo captured step output instead of only the log file
        #[arg(short, long)]
        verbose: bool,
    },
    /// Run only the post-install smoke test
    Test {
        /// Path to the package manifest (TOML)
        manifest: PathBuf,
        /// Install prefix the package was installed under
        #[arg(long)]
        prefix: Option<PathBuf>,
        /// Wall-clock limit in seconds for the verification command
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Validate a manifest without executing anything
    Check {
        /// Path to the package manifest (TOML)
        manifest: PathBuf,
    },
}
