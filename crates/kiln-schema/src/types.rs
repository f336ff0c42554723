//! Core newtypes and enums shared across the descriptor schema.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Errors produced while loading or validating a package descriptor.
///
/// Every variant is surfaced before any external process runs: a manifest
/// that fails here never reaches the dependency gate or the orchestrator.
#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    /// An I/O error occurred while reading a manifest file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be deserialized into a valid descriptor.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required field is empty or absent.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The install procedure contains no steps.
    #[error("Install procedure is empty: at least one [[install]] step is required")]
    EmptyInstall,

    /// A step or test argument references a placeholder outside the
    /// recognized set.
    #[error("Unknown placeholder {{{{{token}}}}} in {location}")]
    UnknownPlaceholder {
        /// Where the placeholder appeared (e.g. `install step 2`, `test`).
        location: String,
        /// The unrecognized token, without braces.
        token: String,
    },

    /// A test operation was requested but the descriptor declares no
    /// `[test]` section.
    #[error("Package '{0}' declares no [test] verification procedure")]
    NoTestSpec(PackageName),
}

/// When a declared dependency is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Must be satisfied before the first install step runs.
    Build,
    /// Recorded for the installed artifact's sake; never gated on
    /// during orchestration.
    Runtime,
}

impl Stage {
    /// String representation matching the manifest's dependency tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Runtime => "runtime",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single named requirement tagged by the stage it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Name of the required package or tool (e.g. `cmake`, `json-c`).
    pub name: PackageName,
    /// Whether the dependency is needed to build or to run.
    pub stage: Stage,
}

impl DependencySpec {
    /// Construct a dependency spec for the given name and stage.
    pub fn new(name: impl Into<PackageName>, stage: Stage) -> Self {
        Self {
            name: name.into(),
            stage,
        }
    }
}

/// Where the package's source code comes from.
///
/// Pass-through metadata: kiln records the reference but never fetches it
/// (source acquisition is the caller's concern).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceSpec {
    /// A versioned source archive with its integrity digest.
    Archive {
        /// Download URL for the archive.
        url: String,
        /// Expected SHA-256 digest of the archive.
        sha256: String,
    },
    /// A live source reference (build from the repository head).
    Git {
        /// Clone URL of the repository.
        git: String,
    },
}

impl SourceSpec {
    /// The upstream location as a displayable string.
    pub fn location(&self) -> &str {
        match self {
            Self::Archive { url, .. } => url,
            Self::Git { git } => git,
        }
    }
}

/// A normalized package name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Create a new package name, normalizing the input to lowercase.
    pub fn new(name: &str) -> Self {
        Self(name.to_lowercase())
    }

    /// Return the normalized name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is empty (an invalid descriptor state).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for PackageName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PackageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PackageName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.to_lowercase()
    }
}

impl PartialEq<&str> for PackageName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.to_lowercase()
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}
