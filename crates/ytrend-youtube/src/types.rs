//! `YouTube` Data API v3 wire types for `videos.list`.
//!
//! ## Observed shape
//!
//! `statistics` counts are decimal **strings** (`"viewCount": "1234"`), not
//! numbers. Any of them may be absent: `likeCount` is hidden when the channel
//! disables public like counts, `commentCount` when comments are off. [`Count`]
//! accepts either representation so fixtures can use plain numbers.
//!
//! `snippet.tags` is omitted entirely when a video has no tags.
//!
//! `snippet.thumbnails` carries up to five sizes; only `default`, `medium`
//! and `high` are guaranteed for ordinary uploads.

use serde::Deserialize;

/// Top-level `videos.list` response.
///
/// Items are kept as raw JSON so that one malformed entry can be skipped
/// without failing the whole page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A single video resource with the `snippet`, `statistics` and
/// `contentDetails` parts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub statistics: Statistics,
    #[serde(default)]
    pub content_details: ContentDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snippet {
    /// RFC 3339 timestamp, e.g. `2026-10-18T14:00:07Z`.
    pub published_at: Option<String>,
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub tags: Vec<String>,
    pub category_id: Option<String>,
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    pub view_count: Option<Count>,
    pub like_count: Option<Count>,
    pub comment_count: Option<Count>,
}

/// A statistics counter as sent by the API (string) or by hand-written
/// fixtures (number).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Number(u64),
    Text(String),
}

impl Count {
    /// Returns the counter value, or `None` if the text is not a
    /// non-negative integer.
    #[must_use]
    pub fn value(&self) -> Option<u64> {
        match self {
            Count::Number(n) => Some(*n),
            Count::Text(s) => s.trim().parse::<u64>().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentDetails {
    /// ISO-8601 duration, e.g. `PT3M21S`.
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Thumbnails {
    #[serde(rename = "default")]
    pub default_size: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Error envelope returned with non-2xx responses:
/// `{"error": {"code": 403, "message": "...", "errors": [{"reason": "quotaExceeded"}]}}`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorReason>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorReason {
    #[serde(default)]
    pub reason: String,
}

impl ApiErrorBody {
    /// Renders `reason1,reason2: message`, falling back to whichever part is present.
    #[must_use]
    pub fn summary(&self) -> String {
        let reasons: Vec<&str> = self
            .error
            .errors
            .iter()
            .map(|e| e.reason.as_str())
            .filter(|r| !r.is_empty())
            .collect();
        match (reasons.is_empty(), self.error.message.is_empty()) {
            (true, true) => "no error detail".to_string(),
            (true, false) => self.error.message.clone(),
            (false, true) => reasons.join(","),
            (false, false) => format!("{}: {}", reasons.join(","), self.error.message),
        }
    }
}
