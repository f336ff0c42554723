//! Build configuration threaded into step-argument resolution.
//!
//! Everything an install procedure can be parameterized on lives here as
//! an explicit object, never ambient process state. The same descriptor
//! and config always render the same command sequence.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one orchestration run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Root directory all relative install paths resolve against.
    /// Substituted for `{{prefix}}` and exported as `$PREFIX`.
    pub prefix: PathBuf,
    /// Extra flags appended to every `{{std_flags}}` expansion, after the
    /// platform defaults.
    pub build_flags: Vec<String>,
    /// Per-step wall-clock limit before forced cancellation. `None` means
    /// steps may run indefinitely.
    pub step_timeout: Option<Duration>,
    /// Parallelism hint exported to build tools as `$JOBS` and
    /// substituted for `{{jobs}}`.
    pub jobs: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            prefix: crate::paths::default_prefix(),
            build_flags: Vec::new(),
            step_timeout: None,
            jobs: num_cpus::get(),
        }
    }
}

impl BuildConfig {
    /// Create a config installing into the given prefix, with defaults
    /// for everything else.
    pub fn with_prefix(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// The installed artifact's binary directory (`<prefix>/bin`),
    /// substituted for `{{bin}}`.
    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    /// Platform default build arguments, the expansion of `{{std_flags}}`:
    /// install prefix and build-type defines for a CMake-style toolchain,
    /// followed by any configured extra flags.
    pub fn std_flags(&self) -> Vec<String> {
        let mut flags = vec![
            format!("-DCMAKE_INSTALL_PREFIX={}", self.prefix.display()),
            "-DCMAKE_BUILD_TYPE=Release".to_string(),
        ];
        flags.extend(self.build_flags.iter().cloned());
        flags
    }
}
