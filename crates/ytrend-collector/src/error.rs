use std::path::PathBuf;

use thiserror::Error;
use ytrend_youtube::YoutubeError;

/// Errors that end a region sweep or prevent a collector from starting.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The credential list was empty. The only fatal misconfiguration.
    #[error("no YouTube API keys configured (set YOUTUBE_API_KEY or YOUTUBE_API_KEY_1..9)")]
    NoCredentials,

    /// Every credential is out of local quota before the region produced
    /// anything.
    #[error("quota exhausted while collecting region {region}: {message}")]
    QuotaExhausted { region: String, message: String },

    /// Every category of the region failed and nothing was collected.
    #[error("every category failed for region {region} ({failed} attempted)")]
    RegionFailed { region: String, failed: usize },

    #[error(transparent)]
    Client(#[from] YoutubeError),
}

impl CollectError {
    /// `true` when the upstream API rejected a request for quota or
    /// authorization reasons, i.e. when switching keys may help.
    #[must_use]
    pub fn is_upstream_quota(&self) -> bool {
        matches!(self, CollectError::Client(e) if e.is_quota_exceeded())
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}
