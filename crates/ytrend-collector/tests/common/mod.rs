//! In-process fakes for the `TrendingSource` / `Connector` seam.

#![allow(dead_code)]

use std::future::Future;
use std::sync::{Arc, Mutex};

use ytrend_collector::{
    Collector, CollectorSettings, Connector, Credential, CredentialRotator, TrendingSource,
};
use ytrend_youtube::{PopularRequest, Video, VideoPage, YoutubeError};

/// A request as seen by the fake, tagged with the key that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub key: String,
    pub region: String,
    pub category: String,
    pub max_results: u32,
    pub page_token: Option<String>,
}

pub type Responder = dyn Fn(&Call) -> Result<VideoPage, YoutubeError> + Send + Sync;

#[derive(Clone)]
pub struct FakeConnector {
    responder: Arc<Responder>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeConnector {
    pub fn new(
        responder: impl Fn(&Call) -> Result<VideoPage, YoutubeError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

pub struct FakeSource {
    key: String,
    responder: Arc<Responder>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl TrendingSource for FakeSource {
    fn list_most_popular(
        &self,
        request: &PopularRequest<'_>,
    ) -> impl Future<Output = Result<VideoPage, YoutubeError>> + Send {
        let call = Call {
            key: self.key.clone(),
            region: request.region_code.to_string(),
            category: request.category_id.to_string(),
            max_results: request.max_results,
            page_token: request.page_token.map(str::to_string),
        };
        let result = (self.responder)(&call);
        self.calls.lock().unwrap().push(call);
        std::future::ready(result)
    }
}

impl Connector for FakeConnector {
    type Source = FakeSource;

    fn connect(&self, api_key: &str) -> Result<FakeSource, YoutubeError> {
        Ok(FakeSource {
            key: api_key.to_string(),
            responder: Arc::clone(&self.responder),
            calls: Arc::clone(&self.calls),
        })
    }
}

/// `count` well-formed videos with ids `<prefix>-<n>`.
pub fn videos(prefix: &str, count: usize) -> Vec<Video> {
    (0..count)
        .map(|n| {
            let mut v: Video = serde_json::from_value(serde_json::json!({
                "id": format!("{prefix}-{n}"),
                "snippet": {"title": format!("video {n}"), "channelId": "UC1", "channelTitle": "Chan"},
                "statistics": {"viewCount": "100", "likeCount": "5", "commentCount": "5"},
                "contentDetails": {"duration": "PT1M"}
            }))
            .unwrap();
            v.snippet.tags = vec!["tag".to_string()];
            v
        })
        .collect()
}

pub fn page(videos: Vec<Video>, next: Option<&str>) -> VideoPage {
    VideoPage {
        videos,
        next_page_token: next.map(str::to_string),
        dropped: 0,
    }
}

pub fn quota_error() -> YoutubeError {
    YoutubeError::QuotaExceeded {
        status: 403,
        reason: "quotaExceeded".to_string(),
    }
}

pub fn server_error() -> YoutubeError {
    YoutubeError::UnexpectedStatus {
        status: 503,
        url: "/youtube/v3/videos".to_string(),
    }
}

pub fn no_delay() -> CollectorSettings {
    CollectorSettings {
        inter_category_delay: std::time::Duration::ZERO,
        inter_region_delay: std::time::Duration::ZERO,
    }
}

pub fn collector(
    keys: &[&str],
    connector: FakeConnector,
    daily_limit: u64,
    seeds: &[u64],
) -> Collector<FakeConnector> {
    let credentials = keys.iter().map(|k| Credential::new(*k)).collect();
    let rotator = CredentialRotator::new(credentials, connector, daily_limit, seeds).unwrap();
    Collector::new(rotator, no_delay())
}
