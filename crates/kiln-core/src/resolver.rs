//! Dependency gate and the external resolver capability.
//!
//! kiln declares needs and checks that they were satisfied; it never
//! locates or installs anything itself. The [`DependencyResolver`] trait
//! is the seam where a real package manager (or a test double) plugs in.

use anyhow::Result;
use async_trait::async_trait;
use kiln_schema::{PackageDescriptor, PackageName};

use crate::error::OrchestrateError;

/// Capability for answering "is this dependency satisfied?".
///
/// Implementations are queried once per build-time dependency, in
/// declaration order, before any install step runs.
#[async_trait]
pub trait DependencyResolver: Send + Sync {
    /// Whether the named dependency is satisfied in the current
    /// environment.
    ///
    /// # Errors
    ///
    /// Implementations may fail for environmental reasons (e.g. a
    /// registry lookup failing); such errors abort orchestration as
    /// [`OrchestrateError::Resolver`], distinct from a clean "not
    /// satisfied" answer.
    async fn is_satisfied(&self, name: &PackageName) -> Result<bool>;
}

/// Resolver that considers a dependency satisfied when a tool of the
/// same name exists on `$PATH`.
///
/// This matches how toolchain dependencies (`cmake`, `pkg-config`) are
/// actually consumed by install procedures: the step invokes them by
/// name. Library dependencies resolved through other channels need a
/// richer resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

#[async_trait]
impl DependencyResolver for PathResolver {
    async fn is_satisfied(&self, name: &PackageName) -> Result<bool> {
        Ok(which::which(name.as_str()).is_ok())
    }
}

/// Check every build-stage dependency of `desc` against the resolver.
///
/// Runtime dependencies are never queried here; they belong to the
/// installed artifact, not the builder.
///
/// # Errors
///
/// Returns [`OrchestrateError::DependencyMissing`] naming the first
/// unsatisfied dependency, or [`OrchestrateError::Resolver`] if the
/// resolver itself fails.
pub async fn check_build_deps(
    desc: &PackageDescriptor,
    resolver: &dyn DependencyResolver,
) -> Result<(), OrchestrateError> {
    for name in desc.build_deps() {
        let satisfied =
            resolver
                .is_satisfied(name)
                .await
                .map_err(|e| OrchestrateError::Resolver {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
        if satisfied {
            tracing::debug!(dep = %name, "build dependency satisfied");
        } else {
            return Err(OrchestrateError::DependencyMissing(name.clone()));
        }
    }
    Ok(())
}
