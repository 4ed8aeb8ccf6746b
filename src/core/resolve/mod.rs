// ─── Dependency Resolution ───
// The resolver is an explicit capability handed to the exporter; nothing
// reaches into shared build state.

mod graph;
mod local;

pub use graph::{ResolvedArtifact, ResolvedComponent, ResolvedGraph};
pub use local::{default_local_repository, ConflictStrategy, LocalRepositoryResolver};

use crate::core::error::ExporterResult;
use crate::core::maven::MavenArtifact;

/// Turns declared coordinates into a transitive graph of local artifacts.
pub trait DependencyResolver {
    fn resolve(&self, declared: &[MavenArtifact]) -> ExporterResult<ResolvedGraph>;
}

impl<R: DependencyResolver + ?Sized> DependencyResolver for &R {
    fn resolve(&self, declared: &[MavenArtifact]) -> ExporterResult<ResolvedGraph> {
        (**self).resolve(declared)
    }
}
