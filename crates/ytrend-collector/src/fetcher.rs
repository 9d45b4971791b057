//! Paginated fetch of one (region, category) chart.

use std::time::Duration;

use ytrend_core::{CollectionScope, TrendingItem};
use ytrend_youtube::{normalize_video, PopularRequest, YoutubeError, MAX_PAGE_SIZE};

use crate::quota::{QuotaTracker, VIDEOS_LIST_COST};
use crate::source::TrendingSource;

/// Fixed pause between consecutive pages of the same chart.
pub const PAGE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub region_code: &'a str,
    pub category_id: &'a str,
    pub max_results: u32,
    pub batch_id: &'a str,
}

/// Items gathered for one chart, ranked `1..=items.len()`.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub items: Vec<TrendingItem>,
    pub pages_requested: u32,
    /// Raw items skipped as malformed, at decode or normalize time.
    pub dropped: usize,
    /// Set when an upstream failure other than quota ended the loop early;
    /// `items` then holds whatever was collected before it.
    pub interrupted: Option<String>,
}

/// Fetches up to `max_results` items, following `nextPageToken`.
///
/// Every issued request is recorded against `tracker`, whatever its result.
/// At most `ceil(max_results / 50)` requests are made. The loop also stops on
/// a page that returns no items at all (usable or malformed), or when
/// `tracker` cannot afford the next page.
///
/// # Errors
///
/// Returns [`YoutubeError::QuotaExceeded`] as soon as the API rejects a
/// request for quota reasons. Other failures do not error; they end the loop
/// and are reported in [`FetchOutcome::interrupted`].
pub async fn fetch_trending<S: TrendingSource>(
    source: &S,
    tracker: &mut QuotaTracker,
    request: &FetchRequest<'_>,
) -> Result<FetchOutcome, YoutubeError> {
    let max_results = request.max_results as usize;
    let max_pages = request.max_results.div_ceil(MAX_PAGE_SIZE);
    let scope = CollectionScope::new(request.region_code, request.category_id, request.batch_id);

    let mut outcome = FetchOutcome::default();
    let mut page_token: Option<String> = None;

    while outcome.items.len() < max_results && outcome.pages_requested < max_pages {
        if outcome.pages_requested > 0 {
            if !tracker.can_proceed(VIDEOS_LIST_COST) {
                tracing::warn!(
                    region = request.region_code,
                    category = request.category_id,
                    collected = outcome.items.len(),
                    "local quota exhausted mid-chart; keeping partial results"
                );
                break;
            }
            tokio::time::sleep(PAGE_DELAY).await;
        }

        let remaining = max_results - outcome.items.len();
        let page_size = u32::try_from(remaining)
            .unwrap_or(MAX_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let page_request = PopularRequest {
            region_code: request.region_code,
            category_id: request.category_id,
            max_results: page_size,
            page_token: page_token.as_deref(),
        };

        let result = source.list_most_popular(&page_request).await;
        tracker.record(VIDEOS_LIST_COST);
        outcome.pages_requested += 1;

        let page = match result {
            Ok(page) => page,
            Err(e) if e.is_quota_exceeded() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    region = request.region_code,
                    category = request.category_id,
                    page = outcome.pages_requested,
                    collected = outcome.items.len(),
                    error = %e,
                    "chart fetch interrupted; keeping partial results"
                );
                outcome.interrupted = Some(e.to_string());
                return Ok(outcome);
            }
        };

        outcome.dropped += page.dropped;
        let page_empty = page.videos.is_empty() && page.dropped == 0;
        for video in &page.videos {
            if outcome.items.len() >= max_results {
                break;
            }
            let rank = u32::try_from(outcome.items.len() + 1).unwrap_or(u32::MAX);
            match normalize_video(video, rank, &scope) {
                Ok(item) => outcome.items.push(item),
                Err(e) => {
                    outcome.dropped += 1;
                    tracing::warn!(
                        region = request.region_code,
                        category = request.category_id,
                        error = %e,
                        "skipping malformed video"
                    );
                }
            }
        }

        // A page of only malformed items still advances the token.
        if page_empty {
            tracing::debug!(
                region = request.region_code,
                category = request.category_id,
                "page returned no items; stopping pagination"
            );
            break;
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    tracing::debug!(
        region = request.region_code,
        category = request.category_id,
        items = outcome.items.len(),
        pages = outcome.pages_requested,
        dropped = outcome.dropped,
        "chart fetched"
    );
    Ok(outcome)
}
