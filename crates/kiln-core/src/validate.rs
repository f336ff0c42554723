//! Descriptor validation
//!
//! Pure structural checks over a parsed [`PackageDescriptor`]. Nothing
//! here touches the filesystem or spawns a process; a descriptor that
//! passes validation is guaranteed to render a complete command sequence
//! without placeholder errors.

use kiln_schema::{ManifestError, PackageDescriptor, TestSpec};

use crate::placeholder::{self, KNOWN_TOKENS, STD_FLAGS};

/// Validate a descriptor's structure.
///
/// Checks, in order:
/// 1. the package name is non-empty,
/// 2. the install procedure has at least one step,
/// 3. every placeholder in every step's command, arguments, and working
///    directory (and the test spec, if present) belongs to the
///    recognized set, with `{{std_flags}}` only as an entire argument.
///
/// # Errors
///
/// Returns the first [`ManifestError`] encountered; a failing descriptor
/// never reaches the dependency gate.
pub fn validate(desc: &PackageDescriptor) -> Result<(), ManifestError> {
    if desc.package.name.is_empty() {
        return Err(ManifestError::MissingField("package.name"));
    }

    if desc.install.is_empty() {
        return Err(ManifestError::EmptyInstall);
    }

    for (i, step) in desc.install.iter().enumerate() {
        let location = format!("install step {}", i + 1);
        check_text(&step.command, &location)?;
        for arg in &step.args {
            check_arg(arg, &location)?;
        }
        if let Some(dir) = &step.workdir {
            check_text(&dir.to_string_lossy(), &location)?;
        }
    }

    if let Some(test) = &desc.test {
        validate_test(test)?;
    }

    Ok(())
}

/// Validate only the `[test]` section (used by the standalone test
/// operation, which skips install-procedure checks).
pub fn validate_test(test: &TestSpec) -> Result<(), ManifestError> {
    check_text(&test.command, "test")?;
    for arg in &test.args {
        check_arg(arg, "test")?;
    }
    Ok(())
}

/// Check a full argument: `{{std_flags}}` is legal only standalone.
fn check_arg(arg: &str, location: &str) -> Result<(), ManifestError> {
    if arg == "{{std_flags}}" {
        return Ok(());
    }
    check_text(arg, location)
}

/// Check one string for unknown tokens. Rejects `std_flags` here too:
/// splicing only works on a whole argument, never inside a larger string,
/// a command, or a working directory.
fn check_text(text: &str, location: &str) -> Result<(), ManifestError> {
    for token in placeholder::tokens(text) {
        if !KNOWN_TOKENS.contains(&token) || token == STD_FLAGS {
            return Err(ManifestError::UnknownPlaceholder {
                location: location.to_string(),
                token: token.to_string(),
            });
        }
    }
    Ok(())
}
