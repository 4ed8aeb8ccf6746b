// ─── Manifest Exporter ───
// resolve -> exclude -> filter -> de-duplicate -> hash -> write

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info, warn};

use super::model::{DependencyDescriptor, DependencyManifest};
use crate::core::config::{ExportTask, MANIFEST_EXTENSION};
use crate::core::error::ExporterResult;
use crate::core::hashing::md5_file;
use crate::core::maven::ModuleId;
use crate::core::resolve::{DependencyResolver, ResolvedArtifact, ResolvedGraph};

/// Steps 2–5 of an export, without touching artifact files.
///
/// Drops artifacts whose `(group, module)` is in `excluded` (any version),
/// keeps only jars with an allowed classifier, drops the project's own API
/// module and collapses repeats of the same artifact.
pub fn select_artifacts<'g>(
    graph: &'g ResolvedGraph,
    excluded: &BTreeSet<ModuleId>,
    allowed_classifiers: &BTreeSet<String>,
    self_module: &str,
) -> Vec<&'g ResolvedArtifact> {
    let mut seen: HashSet<&ResolvedArtifact> = HashSet::new();

    graph
        .first_level_artifacts()
        .into_iter()
        .filter(|artifact| !excluded.contains(&artifact.module_id()))
        .filter(|artifact| {
            artifact.extension == MANIFEST_EXTENSION
                && allowed_classifiers.contains(artifact.classifier_or_empty())
        })
        .filter(|artifact| artifact.module != self_module)
        .filter(|artifact| seen.insert(*artifact))
        .collect()
}

/// Builds dependency manifests from a resolver handed in by the caller.
pub struct ManifestExporter<R> {
    resolver: R,
}

impl<R: DependencyResolver> ManifestExporter<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// `(group, module)` closure of the task's exclude configuration.
    fn excluded_modules(&self, task: &ExportTask) -> ExporterResult<BTreeSet<ModuleId>> {
        let Some(excludes) = task.declared_excludes()? else {
            return Ok(BTreeSet::new());
        };
        let graph = self.resolver.resolve(&excludes)?;
        let modules = graph.module_ids();
        debug!(
            "Exclude configuration supplies {} modules from {} declarations",
            modules.len(),
            excludes.len()
        );
        Ok(modules)
    }

    /// Resolve, filter and hash. Nothing is written.
    pub fn generate(&self, task: &ExportTask) -> ExporterResult<DependencyManifest> {
        let declared = task.declared()?;
        let graph = self.resolver.resolve(&declared)?;
        let excluded = self.excluded_modules(task)?;

        let selected = select_artifacts(
            &graph,
            &excluded,
            &task.allowed_classifiers,
            &task.self_module,
        );

        let mut coordinates: HashSet<(&str, &str, &str)> = HashSet::new();
        let mut dependencies = Vec::with_capacity(selected.len());
        for artifact in selected {
            let key = (
                artifact.group.as_str(),
                artifact.module.as_str(),
                artifact.version.as_str(),
            );
            if !coordinates.insert(key) {
                warn!(
                    "Dropping {:?} ({}): {}:{}:{} is already listed",
                    artifact.file,
                    artifact.classifier_or_empty(),
                    artifact.group,
                    artifact.module,
                    artifact.version
                );
                continue;
            }

            let md5 = md5_file(&artifact.file)?;
            debug!(
                "{}:{}:{} -> {}",
                artifact.group, artifact.module, artifact.version, md5
            );
            dependencies.push(DependencyDescriptor {
                group: artifact.group.clone(),
                module: artifact.module.clone(),
                version: artifact.version.clone(),
                md5,
            });
        }

        info!(
            "Manifest lists {} libraries ({} modules excluded)",
            dependencies.len(),
            excluded.len()
        );
        Ok(DependencyManifest::new(dependencies))
    }

    /// Generate and write to the task's output file.
    pub fn export(&self, task: &ExportTask) -> ExporterResult<DependencyManifest> {
        let manifest = self.generate(task)?;
        manifest.write(&task.output_file)?;
        Ok(manifest)
    }
}
