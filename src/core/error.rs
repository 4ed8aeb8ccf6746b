use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the exporter and its installer-side consumers.
/// Every module returns `Result<T, ExporterError>`.
#[derive(Debug, Error)]
pub enum ExporterError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("MD5 mismatch for {path:?}: expected {expected}, got {actual}")]
    Md5Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Maven ───────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    #[error("POM parse error: {0}")]
    PomParse(String),

    // ── Resolution ──────────────────────────────────────
    #[error("Could not resolve {coordinate}: no artifact file in {searched} repositories")]
    UnresolvedArtifact { coordinate: String, searched: usize },

    #[error("Cannot determine the version of {dependency} required by {required_by}")]
    UnresolvedVersion {
        dependency: String,
        required_by: String,
    },

    #[error("Version conflict on {module}: {first} vs {second}")]
    VersionConflict {
        module: String,
        first: String,
        second: String,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Configuration ───────────────────────────────────
    #[error("Invalid export task: {0}")]
    Config(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type ExporterResult<T> = Result<T, ExporterError>;

impl ExporterError {
    /// Wrap an IO error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExporterError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for ExporterError {
    fn from(source: std::io::Error) -> Self {
        ExporterError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
