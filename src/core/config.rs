// ─── Export Task ───
// JSON description of one export run: what to resolve, what to leave out,
// where to write.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{ExporterError, ExporterResult};
use crate::core::maven::MavenArtifact;
use crate::core::resolve::{default_local_repository, ConflictStrategy};

/// Module name of the project's own API artifact, never listed as a library.
pub const DEFAULT_SELF_MODULE: &str = "SpongeAPI";

/// Only package archives are listed.
pub const MANIFEST_EXTENSION: &str = "jar";

fn default_allowed_classifiers() -> BTreeSet<String> {
    BTreeSet::from([String::new()])
}

fn default_self_module() -> String {
    DEFAULT_SELF_MODULE.to_string()
}

/// Inputs of one export, fixed before it runs.
///
/// ```json
/// {
///   "configuration": ["org.spongepowered:mixin:0.8.2"],
///   "excludeConfiguration": ["cpw.mods:modlauncher:8.0.9"],
///   "allowedClassifiers": ["service"],
///   "outputFile": "build/generated/resources/installer/libraries.json",
///   "repositories": ["libs"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTask {
    /// Direct dependency coordinates whose transitive closure is listed.
    pub configuration: Vec<String>,
    /// Coordinates whose transitive `(group, module)` closure is left out.
    #[serde(default)]
    pub exclude_configuration: Option<Vec<String>>,
    /// Acceptable classifiers. The empty string (no classifier) is always included.
    #[serde(default = "default_allowed_classifiers")]
    pub allowed_classifiers: BTreeSet<String>,
    pub output_file: PathBuf,
    /// Local Maven-layout repositories, searched in order.
    #[serde(default)]
    pub repositories: Vec<PathBuf>,
    #[serde(default = "default_self_module")]
    pub self_module: String,
    #[serde(default)]
    pub conflict_strategy: ConflictStrategy,
}

impl ExportTask {
    pub fn new(configuration: Vec<String>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            configuration,
            exclude_configuration: None,
            allowed_classifiers: default_allowed_classifiers(),
            output_file: output_file.into(),
            repositories: Vec::new(),
            self_module: default_self_module(),
            conflict_strategy: ConflictStrategy::default(),
        }
    }

    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.exclude_configuration = Some(excludes);
        self
    }

    pub fn allow_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.allowed_classifiers.insert(classifier.into());
        self
    }

    pub fn with_repository(mut self, repository: impl Into<PathBuf>) -> Self {
        self.repositories.push(repository.into());
        self
    }

    /// Load a task file. Relative paths inside it are taken from the file's directory.
    pub fn load(path: &Path) -> ExporterResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| ExporterError::io(path, e))?;
        let mut task: ExportTask = serde_json::from_str(&json)
            .map_err(|e| ExporterError::Config(format!("{}: {}", path.display(), e)))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        task.output_file = base.join(&task.output_file);
        task.repositories = task
            .repositories
            .iter()
            .map(|repo| base.join(repo))
            .collect();
        task.normalize();
        task.validate()?;

        debug!("Loaded export task from {:?}", path);
        Ok(task)
    }

    /// Re-establish defaults a task file may have dropped.
    pub fn normalize(&mut self) {
        self.allowed_classifiers.insert(String::new());
        for coord in &mut self.configuration {
            *coord = coord.trim().to_string();
        }
        self.configuration.retain(|c| !c.is_empty());
        if let Some(excludes) = &mut self.exclude_configuration {
            for coord in excludes.iter_mut() {
                *coord = coord.trim().to_string();
            }
            excludes.retain(|c| !c.is_empty());
        }
    }

    /// Reject coordinates that do not parse and tasks without an output path.
    pub fn validate(&self) -> ExporterResult<()> {
        if self.output_file.as_os_str().is_empty() {
            return Err(ExporterError::Config("outputFile is empty".into()));
        }
        self.declared()?;
        self.declared_excludes()?;
        Ok(())
    }

    pub fn declared(&self) -> ExporterResult<Vec<MavenArtifact>> {
        self.configuration
            .iter()
            .map(|c| MavenArtifact::parse(c))
            .collect()
    }

    /// `None` when no exclude configuration is set.
    pub fn declared_excludes(&self) -> ExporterResult<Option<Vec<MavenArtifact>>> {
        self.exclude_configuration
            .as_ref()
            .map(|list| {
                list.iter()
                    .map(|c| MavenArtifact::parse(c))
                    .collect::<ExporterResult<Vec<_>>>()
            })
            .transpose()
    }

    /// Configured repositories, or the user's local Maven repository.
    pub fn effective_repositories(&self) -> Vec<PathBuf> {
        if !self.repositories.is_empty() {
            return self.repositories.clone();
        }
        default_local_repository().into_iter().collect()
    }

    pub fn is_classifier_allowed(&self, classifier: &str) -> bool {
        self.allowed_classifiers.contains(classifier)
    }
}
