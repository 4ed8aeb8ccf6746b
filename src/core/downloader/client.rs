use std::path::{Path, PathBuf};

use futures_util::stream::{self, StreamExt};
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::error::{ExporterError, ExporterResult};
use crate::core::hashing::md5_bytes;
use crate::core::http::build_http_client;

/// A single file to download, with mirrors tried in order and an optional MD5.
#[derive(Debug, Clone)]
pub struct DownloadEntry {
    pub urls: Vec<String>,
    pub dest: PathBuf,
    pub md5: Option<String>,
}

/// Concurrent, MD5 validated downloader.
pub struct Downloader {
    client: Client,
    /// Maximum number of parallel downloads.
    concurrency: usize,
}

impl Downloader {
    pub fn new() -> ExporterResult<Self> {
        Ok(Self::with_client(build_http_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            concurrency: 8,
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    // ── Single file download ────────────────────────────

    /// Download a single file to `dest`, optionally validating MD5.
    ///
    /// Creates parent directories as needed. Nothing is written when the
    /// digest does not match.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        md5_expected: Option<&str>,
    ) -> ExporterResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ExporterError::io(parent, e))?;
        }

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;

        // Validate before writing (compute on the in-memory buffer)
        if let Some(expected) = md5_expected {
            let actual = md5_bytes(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(ExporterError::Md5Mismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        // Scoped so the handle is closed before returning
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| ExporterError::io(dest, e))?;
            file.write_all(&bytes)
                .await
                .map_err(|e| ExporterError::io(dest, e))?;
            file.flush().await.map_err(|e| ExporterError::io(dest, e))?;
        }

        debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, bytes.len());
        Ok(())
    }

    /// Try each mirror of `entry` until one succeeds.
    pub async fn download_entry(&self, entry: &DownloadEntry) -> ExporterResult<()> {
        let mut last_err: Option<ExporterError> = None;

        for url in &entry.urls {
            match self.download_file(url, &entry.dest, entry.md5.as_deref()).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    debug!("Mirror {} failed for {:?}: {}", url, entry.dest, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ExporterError::Other(format!("No repositories configured for {:?}", entry.dest))
        }))
    }

    // ── Batch concurrent downloads ──────────────────────

    /// Download many files concurrently using `buffer_unordered`.
    ///
    /// Returns the list of files that failed (if any).
    pub async fn download_batch(
        &self,
        entries: Vec<DownloadEntry>,
    ) -> Vec<(DownloadEntry, ExporterError)> {
        info!(
            "Starting batch download: {} files, concurrency={}",
            entries.len(),
            self.concurrency
        );

        let results: Vec<_> = stream::iter(entries)
            .map(|entry| async move {
                let result = self.download_entry(&entry).await;
                (entry, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|(entry, result)| match result {
                Ok(()) => None,
                Err(e) => Some((entry, e)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const JAR_PATH: &str = "/com/example/foo/1.0/foo-1.0.jar";

    #[tokio::test]
    async fn matching_download_is_written() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(JAR_PATH);
                then.status(200).body("jar bytes");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("com/example/foo/1.0/foo-1.0.jar");
        let digest = md5_bytes(b"jar bytes");
        let downloader = Downloader::new().unwrap();
        downloader
            .download_file(&server.url(JAR_PATH), &dest, Some(digest.as_str()))
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"jar bytes");
    }

    #[tokio::test]
    async fn digest_mismatch_writes_nothing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(JAR_PATH);
                then.status(200).body("tampered");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("foo-1.0.jar");
        let digest = md5_bytes(b"jar bytes");
        let downloader = Downloader::new().unwrap();
        let err = downloader
            .download_file(&server.url(JAR_PATH), &dest, Some(digest.as_str()))
            .await
            .unwrap_err();

        assert!(matches!(err, ExporterError::Md5Mismatch { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn later_mirror_is_tried_after_a_failure() {
        let server = MockServer::start_async().await;
        let broken = server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/broken{JAR_PATH}"));
                then.status(404);
            })
            .await;
        let good = server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/good{JAR_PATH}"));
                then.status(200).body("jar bytes");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let entry = DownloadEntry {
            urls: vec![
                server.url(format!("/broken{JAR_PATH}")),
                server.url(format!("/good{JAR_PATH}")),
            ],
            dest: dir.path().join("foo-1.0.jar"),
            md5: Some(md5_bytes(b"jar bytes")),
        };
        Downloader::new()
            .unwrap()
            .download_entry(&entry)
            .await
            .unwrap();

        assert_eq!(broken.hits_async().await, 1);
        assert_eq!(good.hits_async().await, 1);
        assert_eq!(std::fs::read(&entry.dest).unwrap(), b"jar bytes");
    }

    #[tokio::test]
    async fn entry_without_mirrors_fails_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new().unwrap();
        let entry = DownloadEntry {
            urls: Vec::new(),
            dest: dir.path().join("lib.jar"),
            md5: None,
        };

        let err = downloader.download_entry(&entry).await.unwrap_err();
        assert!(matches!(err, ExporterError::Other(_)));
        assert!(!entry.dest.exists());
    }

    #[tokio::test]
    async fn batch_reports_every_failure() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new().unwrap().with_concurrency(2);
        let entries: Vec<_> = (0..3)
            .map(|i| DownloadEntry {
                urls: Vec::new(),
                dest: dir.path().join(format!("lib-{i}.jar")),
                md5: None,
            })
            .collect();

        let failures = downloader.download_batch(entries).await;
        assert_eq!(failures.len(), 3);
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let downloader = Downloader::new().unwrap().with_concurrency(0);
        assert_eq!(downloader.concurrency(), 1);
    }
}
