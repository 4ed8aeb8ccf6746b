// ─── Library Verification ───
// Installer side: which manifest entries are already present and intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::error::{ExporterError, ExporterResult};
use crate::core::hashing::md5_hex;
use crate::core::manifest::{DependencyDescriptor, DependencyManifest};

/// Outcome of checking a library directory against a manifest.
#[derive(Debug, Default)]
pub struct VerifyReport {
    pub verified: Vec<DependencyDescriptor>,
    pub missing: Vec<DependencyDescriptor>,
    /// Entries whose file exists but hashes differently, with the actual digest.
    pub mismatched: Vec<(DependencyDescriptor, String)>,
}

impl VerifyReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.mismatched.is_empty()
    }

    /// Entries an installer still has to download.
    pub fn needs_fetch(&self) -> Vec<&DependencyDescriptor> {
        self.missing
            .iter()
            .chain(self.mismatched.iter().map(|(d, _)| d))
            .collect()
    }
}

/// Where a descriptor's jar lives under `libraries_dir`.
pub fn library_path(libraries_dir: &Path, descriptor: &DependencyDescriptor) -> PathBuf {
    libraries_dir.join(descriptor.artifact().local_path())
}

/// Hash every listed library under `libraries_dir` and compare with the manifest.
///
/// Absent files are reported, not raised; any other read failure aborts.
pub fn verify_libraries(
    manifest: &DependencyManifest,
    libraries_dir: &Path,
) -> ExporterResult<VerifyReport> {
    let mut report = VerifyReport::default();

    for descriptor in &manifest.dependencies {
        let path = library_path(libraries_dir, descriptor);
        let file = match std::fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Missing {}", descriptor.coordinate());
                report.missing.push(descriptor.clone());
                continue;
            }
            Err(e) => return Err(ExporterError::io(&path, e)),
        };

        let actual = md5_hex(file).map_err(|e| ExporterError::io(&path, e))?;
        if actual.eq_ignore_ascii_case(&descriptor.md5) {
            report.verified.push(descriptor.clone());
        } else {
            debug!(
                "MD5 mismatch for {}: expected {}, got {}",
                descriptor.coordinate(),
                descriptor.md5,
                actual
            );
            report.mismatched.push((descriptor.clone(), actual));
        }
    }

    info!(
        "Verified {} libraries: {} ok, {} missing, {} mismatched",
        manifest.len(),
        report.verified.len(),
        report.missing.len(),
        report.mismatched.len()
    );
    Ok(report)
}
