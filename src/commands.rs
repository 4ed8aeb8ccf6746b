use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cli::ExportArgs;
use crate::core::config::ExportTask;
use crate::core::downloader::{fetch_libraries, Downloader};
use crate::core::error::{ExporterError, ExporterResult};
use crate::core::manifest::{DependencyManifest, ManifestExporter};
use crate::core::maven::{MAVEN_CENTRAL, SPONGE_MAVEN};
use crate::core::resolve::LocalRepositoryResolver;
use crate::core::verify::verify_libraries;

/// Assemble a task from command-line flags.
fn task_from_args(args: ExportArgs) -> ExporterResult<ExportTask> {
    if let Some(path) = &args.task {
        return ExportTask::load(path);
    }

    let output = args
        .output
        .ok_or_else(|| ExporterError::Config("either --task or --output is required".into()))?;

    let mut task = ExportTask::new(args.dependencies, output);
    if !args.excludes.is_empty() {
        task = task.with_excludes(args.excludes);
    }
    for classifier in args.classifiers {
        task = task.allow_classifier(classifier);
    }
    for repo in args.repositories {
        task = task.with_repository(repo);
    }
    if let Some(self_module) = args.self_module {
        task.self_module = self_module;
    }
    task.conflict_strategy = args.conflicts.into();

    task.normalize();
    task.validate()?;
    Ok(task)
}

pub fn export(args: ExportArgs) -> ExporterResult<()> {
    let task = task_from_args(args)?;
    let repositories = task.effective_repositories();
    if repositories.is_empty() {
        return Err(ExporterError::Config(
            "no repository given and no home directory for ~/.m2/repository".into(),
        ));
    }

    info!(
        "Exporting {} declared dependencies against {} repositories",
        task.configuration.len(),
        repositories.len()
    );
    let resolver =
        LocalRepositoryResolver::new(repositories).with_strategy(task.conflict_strategy);
    let manifest = ManifestExporter::new(resolver).export(&task)?;
    info!(
        "Wrote {} libraries to {:?}",
        manifest.len(),
        task.output_file
    );
    Ok(())
}

const CLASSIFIER_NOTE: &str =
    "entries exported from classifier-only artifacts are looked up as the plain jar and cannot match";

pub fn verify(manifest_path: &Path, libraries: &Path) -> ExporterResult<()> {
    let manifest = DependencyManifest::read(manifest_path)?;
    let report = verify_libraries(&manifest, libraries)?;

    for descriptor in &report.missing {
        warn!("Missing: {}", descriptor.coordinate());
    }
    for (descriptor, actual) in &report.mismatched {
        warn!(
            "MD5 mismatch: {} (expected {}, found {})",
            descriptor.coordinate(),
            descriptor.md5,
            actual
        );
    }
    if !report.mismatched.is_empty() {
        warn!("Note: {}", CLASSIFIER_NOTE);
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(ExporterError::Other(format!(
            "{} of {} libraries need fetching",
            report.needs_fetch().len(),
            manifest.len()
        )))
    }
}

pub fn fetch(
    manifest_path: &Path,
    libraries: &Path,
    mut repositories: Vec<String>,
    concurrency: usize,
) -> ExporterResult<()> {
    let manifest = DependencyManifest::read(manifest_path)?;
    if repositories.is_empty() {
        repositories = vec![SPONGE_MAVEN.to_string(), MAVEN_CENTRAL.to_string()];
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ExporterError::io(PathBuf::new(), e))?;

    let report = runtime.block_on(async {
        let downloader = Downloader::new()?.with_concurrency(concurrency);
        fetch_libraries(&manifest, libraries, &repositories, &downloader).await
    })?;

    if report.is_success() {
        Ok(())
    } else {
        warn!("Note: {}", CLASSIFIER_NOTE);
        Err(ExporterError::Other(format!(
            "{} libraries could not be fetched: {}",
            report.failed.len(),
            report
                .failed
                .iter()
                .map(|(path, _)| path.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}
