use std::path::Path;

use tracing::{info, warn};

use super::client::{DownloadEntry, Downloader};
use crate::core::error::ExporterResult;
use crate::core::manifest::DependencyManifest;
use crate::core::verify::{library_path, verify_libraries};

/// What a fetch run did.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Libraries that were already present and intact.
    pub up_to_date: usize,
    pub downloaded: Vec<String>,
    /// Coordinate and error message for each library no mirror could supply.
    pub failed: Vec<(String, String)>,
}

impl FetchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Build one download entry per library that is missing or stale.
pub fn plan_downloads(
    manifest: &DependencyManifest,
    libraries_dir: &Path,
    repositories: &[String],
) -> ExporterResult<(usize, Vec<DownloadEntry>)> {
    let report = verify_libraries(manifest, libraries_dir)?;
    let entries = report
        .needs_fetch()
        .into_iter()
        .map(|descriptor| {
            let artifact = descriptor.artifact();
            DownloadEntry {
                urls: repositories.iter().map(|repo| artifact.url(repo)).collect(),
                dest: library_path(libraries_dir, descriptor),
                md5: Some(descriptor.md5.clone()),
            }
        })
        .collect();
    Ok((report.verified.len(), entries))
}

/// Bring `libraries_dir` in line with `manifest`, downloading from
/// `repositories` (tried in order) whatever is missing or fails its MD5.
pub async fn fetch_libraries(
    manifest: &DependencyManifest,
    libraries_dir: &Path,
    repositories: &[String],
    downloader: &Downloader,
) -> ExporterResult<FetchReport> {
    let (up_to_date, entries) = plan_downloads(manifest, libraries_dir, repositories)?;
    let mut report = FetchReport {
        up_to_date,
        ..FetchReport::default()
    };
    if entries.is_empty() {
        info!("All {} libraries are up to date", up_to_date);
        return Ok(report);
    }

    let requested: Vec<_> = entries.iter().map(|e| e.dest.clone()).collect();
    let failures = downloader.download_batch(entries).await;

    for dest in requested {
        match failures.iter().find(|(entry, _)| entry.dest == dest) {
            Some((_, err)) => {
                warn!("Could not fetch {:?}: {}", dest, err);
                report
                    .failed
                    .push((dest.display().to_string(), err.to_string()));
            }
            None => report.downloaded.push(dest.display().to_string()),
        }
    }

    info!(
        "Fetched {} libraries, {} failed, {} already present",
        report.downloaded.len(),
        report.failed.len(),
        report.up_to_date
    );
    Ok(report)
}
