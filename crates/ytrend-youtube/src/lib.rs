//! Client for the `YouTube` Data API v3 `videos.list` most-popular chart.

pub mod client;
pub mod error;
pub mod normalize;
pub mod retry;
pub mod types;

pub use client::{ClientOptions, PopularRequest, VideoPage, YoutubeClient, MAX_PAGE_SIZE};
pub use error::{NormalizeError, YoutubeError};
pub use normalize::normalize_video;
pub use types::{ApiErrorBody, Video, VideoListResponse};
