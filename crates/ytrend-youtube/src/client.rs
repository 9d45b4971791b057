//! HTTP client for the `YouTube` Data API v3 `videos.list` endpoint.
//!
//! Wraps `reqwest` with API-key handling, typed error mapping, and retry with
//! back-off for transient failures. Each page is decoded item by item so a
//! single malformed video does not discard the rest of the page.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::YoutubeError;
use crate::retry::retry_with_backoff;
use crate::types::{ApiErrorBody, Video, VideoListResponse};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// The listing endpoint caps `maxResults` at 50 regardless of what is asked.
pub const MAX_PAGE_SIZE: u32 = 50;

const VIDEO_PARTS: &str = "snippet,statistics,contentDetails";

/// Transport settings shared by every client built for a collection run.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for retriable errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "ytrend/0.1 (trending-collector)".to_string(),
            max_retries: 2,
            backoff_base_ms: 1_000,
        }
    }
}

/// One `mostPopular` page request.
#[derive(Debug, Clone, Copy)]
pub struct PopularRequest<'a> {
    pub region_code: &'a str,
    pub category_id: &'a str,
    /// Clamped to `1..=MAX_PAGE_SIZE` when the URL is built.
    pub max_results: u32,
    pub page_token: Option<&'a str>,
}

/// A decoded page: the videos that parsed, the cursor for the next page, and
/// how many raw items were dropped as malformed.
#[derive(Debug, Default)]
pub struct VideoPage {
    pub videos: Vec<Video>,
    pub next_page_token: Option<String>,
    pub dropped: usize,
}

/// Client bound to a single API key.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    videos_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl YoutubeClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, options: &ClientOptions) -> Result<Self, YoutubeError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, options)
    }

    /// Creates a new client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`YoutubeError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        options: &ClientOptions,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash, so `join("videos")` appends a segment
        // instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let invalid = |reason: String| YoutubeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let videos_url = Url::parse(&normalised)
            .and_then(|u| u.join("videos"))
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            videos_url,
            max_retries: options.max_retries,
            backoff_base_ms: options.backoff_base_ms,
        })
    }

    /// Fetches one page of the `mostPopular` chart for a region and category.
    ///
    /// Transient failures (network, 429, 5xx) are retried with back-off;
    /// quota and authorization failures are returned immediately.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::QuotaExceeded`] on HTTP 401 or 403.
    /// - [`YoutubeError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`YoutubeError::Http`] on network failure after all retries.
    /// - [`YoutubeError::Deserialize`] if the page envelope is not valid JSON.
    pub async fn list_most_popular(
        &self,
        request: &PopularRequest<'_>,
    ) -> Result<VideoPage, YoutubeError> {
        let url = self.build_url(request);
        let context = format!(
            "videos.list(region={}, category={})",
            request.region_code, request.category_id
        );

        let response = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_page(&url, &context)
        })
        .await?;

        Ok(decode_items(response, &context))
    }

    /// Builds the request URL with percent-encoded query parameters.
    fn build_url(&self, request: &PopularRequest<'_>) -> Url {
        let page_size = request.max_results.clamp(1, MAX_PAGE_SIZE).to_string();
        let mut url = self.videos_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("part", VIDEO_PARTS);
            pairs.append_pair("chart", "mostPopular");
            pairs.append_pair("regionCode", request.region_code);
            pairs.append_pair("videoCategoryId", request.category_id);
            pairs.append_pair("maxResults", &page_size);
            if let Some(token) = request.page_token {
                pairs.append_pair("pageToken", token);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    /// Sends one GET and maps the status to a typed error.
    ///
    /// Error values carry the endpoint path only; the query string holds the
    /// API key and is never surfaced.
    async fn request_page(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<VideoListResponse, YoutubeError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ApiErrorBody>(&body)
                .map_or_else(|_| "no error detail".to_string(), |b| b.summary());
            return Err(YoutubeError::QuotaExceeded {
                status: status.as_u16(),
                reason,
            });
        }

        if !status.is_success() {
            return Err(YoutubeError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.videos_url.path().to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<VideoListResponse>(&body).map_err(|e| YoutubeError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

/// Decodes each raw item independently, keeping the ones that parse.
fn decode_items(response: VideoListResponse, context: &str) -> VideoPage {
    let mut dropped = 0usize;
    let videos = response
        .items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, raw)| {
            serde_json::from_value::<Video>(raw)
                .map_err(|e| {
                    dropped += 1;
                    tracing::warn!(context, position = idx, error = %e, "skipping malformed video item");
                })
                .ok()
        })
        .collect();

    VideoPage {
        videos,
        next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        dropped,
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
