use thiserror::Error;

/// Errors returned by the `YouTube` API client.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 401/403: the key is out of quota or not authorized. Recoverable
    /// only by switching to another key.
    #[error("quota exceeded or key rejected (HTTP {status}): {reason}")]
    QuotaExceeded { status: u16, reason: String },

    /// Any other non-2xx response.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl YoutubeError {
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, YoutubeError::QuotaExceeded { .. })
    }
}

/// A single raw video that could not be turned into a trending item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("video has an empty id")]
    MissingId,

    #[error("video {video_id}: {field} is not a non-negative integer: {value:?}")]
    InvalidCount {
        video_id: String,
        field: &'static str,
        value: String,
    },
}
