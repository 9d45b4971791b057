//! The seam between the collector and the HTTP client.

use std::future::Future;

use ytrend_core::AppConfig;
use ytrend_youtube::{ClientOptions, PopularRequest, VideoPage, YoutubeClient, YoutubeError};

use crate::credentials::Connector;

/// Anything that can serve one page of a most-popular chart.
pub trait TrendingSource: Send + Sync {
    fn list_most_popular(
        &self,
        request: &PopularRequest<'_>,
    ) -> impl Future<Output = Result<VideoPage, YoutubeError>> + Send;
}

impl TrendingSource for YoutubeClient {
    fn list_most_popular(
        &self,
        request: &PopularRequest<'_>,
    ) -> impl Future<Output = Result<VideoPage, YoutubeError>> + Send {
        YoutubeClient::list_most_popular(self, request)
    }
}

/// Builds a [`YoutubeClient`] per API key, all sharing one base URL and set
/// of transport options.
#[derive(Debug, Clone)]
pub struct YoutubeConnector {
    base_url: String,
    options: ClientOptions,
}

impl YoutubeConnector {
    #[must_use]
    pub fn new(base_url: impl Into<String>, options: ClientOptions) -> Self {
        Self {
            base_url: base_url.into(),
            options,
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            config.youtube_base_url.clone(),
            ClientOptions {
                timeout_secs: config.request_timeout_secs,
                user_agent: config.user_agent.clone(),
                max_retries: config.max_retries,
                backoff_base_ms: config.retry_backoff_base_ms,
            },
        )
    }
}

impl Connector for YoutubeConnector {
    type Source = YoutubeClient;

    fn connect(&self, api_key: &str) -> Result<YoutubeClient, YoutubeError> {
        YoutubeClient::with_base_url(api_key, &self.base_url, &self.options)
    }
}
