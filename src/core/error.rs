use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Central error type for the sync and launch engine.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
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

    #[error("Transfer stalled for {path}: no data for {seconds}s")]
    Stalled { path: String, seconds: u64 },

    // ── Integrity ───────────────────────────────────────
    #[error("Integrity mismatch for {path:?}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Manifest / configuration ────────────────────────
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Cycle state ─────────────────────────────────────
    #[error("A sync cycle is already running for this installation")]
    SyncInProgress,

    #[error("No completed sync cycle to clean up after")]
    NoCompletedCycle,

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

/// Coarse failure classes the caller uses to decide what to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Manifest or file fetch failed. Retry with backoff.
    Transport,
    /// Hash or size mismatch. The file is fetched again next cycle.
    Integrity,
    /// Permission denied, locked file, disk full.
    FileSystem,
    /// Malformed manifest, rule or settings. Fatal for the cycle.
    Configuration,
}

impl LauncherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LauncherError::Http(_)
            | LauncherError::DownloadFailed { .. }
            | LauncherError::Stalled { .. } => ErrorKind::Transport,
            LauncherError::IntegrityMismatch { .. } => ErrorKind::Integrity,
            LauncherError::Io { .. } | LauncherError::Zip(_) => ErrorKind::FileSystem,
            LauncherError::InvalidManifest(_)
            | LauncherError::InvalidSettings(_)
            | LauncherError::InvalidUrl { .. }
            | LauncherError::Json(_)
            | LauncherError::SyncInProgress
            | LauncherError::NoCompletedCycle
            | LauncherError::Other(_) => ErrorKind::Configuration,
        }
    }

    /// Only transport failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

// ── Serialization for UI events ─────────────────────────
// Errors travel to the presentation layer as plain strings.
impl Serialize for LauncherError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
