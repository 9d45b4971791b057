//! Domain types shared by the fetcher, the store, and the snapshot writer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::category_name;

/// Descriptions are cut to this many characters before storage.
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// One ranked video observed in one (region, category) chart at collection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingItem {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub category_id: String,
    pub category_name: String,
    pub region_code: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    /// ISO-8601 duration as returned by the API, e.g. `PT4M13S`.
    pub duration: String,
    pub tags: Vec<String>,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub engagement_rate: f64,
    /// 1-based position within its (region, category) chart.
    pub trending_rank: u32,
    pub collected_at: DateTime<Utc>,
    pub batch_id: String,
}

/// The (region, category) chart a page of items belongs to, plus the batch
/// it is collected under.
#[derive(Debug, Clone)]
pub struct CollectionScope {
    pub region_code: String,
    pub category_id: String,
    pub category_name: String,
    pub batch_id: String,
    pub collected_at: DateTime<Utc>,
}

impl CollectionScope {
    /// Builds a scope, resolving the category's display name from the catalog
    /// (`"Unknown"` for ids outside it).
    #[must_use]
    pub fn new(region_code: &str, category_id: &str, batch_id: &str) -> Self {
        Self {
            region_code: region_code.to_string(),
            category_id: category_id.to_string(),
            category_name: category_name(category_id).unwrap_or("Unknown").to_string(),
            batch_id: batch_id.to_string(),
            collected_at: Utc::now(),
        }
    }
}

/// Run-level outcome returned to the CLI and stored as a `collection_stats` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub batch_id: String,
    pub collected_at: DateTime<Utc>,
    pub total_videos_collected: usize,
    pub regions_attempted: usize,
    pub regions_processed: usize,
    pub categories_processed: usize,
    pub api_requests_made: u64,
    pub quota_used: u64,
    pub errors: usize,
    pub processing_time_seconds: f64,
    /// Percentage of attempted regions that completed, `0.0` when none were attempted.
    pub success_rate: f64,
}

/// `(likes + comments) / views * 100`, or exactly `0.0` when there are no views.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn engagement_rate(views: u64, likes: u64, comments: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    let interactions = likes.saturating_add(comments) as f64;
    interactions / views as f64 * 100.0
}

/// Truncates `s` to at most `max_chars` characters without splitting a code point.
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_rate_is_zero_without_views() {
        assert!(engagement_rate(0, 0, 0).abs() < f64::EPSILON);
        assert!(engagement_rate(0, 500, 20).abs() < f64::EPSILON);
    }

    #[test]
    fn engagement_rate_percentage() {
        let rate = engagement_rate(1_000, 40, 10);
        assert!((rate - 5.0).abs() < 1e-9, "got {rate}");
    }

    #[test]
    fn engagement_rate_can_exceed_one_hundred() {
        let rate = engagement_rate(10, 30, 0);
        assert!((rate - 300.0).abs() < 1e-9, "got {rate}");
    }

    #[test]
    fn engagement_rate_is_never_negative_or_nan() {
        for (v, l, c) in [(1, 0, 0), (u64::MAX, u64::MAX, u64::MAX), (7, 3, 2)] {
            let rate = engagement_rate(v, l, c);
            assert!(rate.is_finite() && rate >= 0.0, "({v},{l},{c}) -> {rate}");
        }
    }

    #[test]
    fn truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
        let long: String = "🎵".repeat(DESCRIPTION_MAX_CHARS + 5);
        assert_eq!(
            truncate_chars(&long, DESCRIPTION_MAX_CHARS).chars().count(),
            DESCRIPTION_MAX_CHARS
        );
    }

    #[test]
    fn scope_resolves_category_name() {
        let scope = CollectionScope::new("US", "10", "20260101_000000");
        assert_eq!(scope.category_name, "Music");
        let unknown = CollectionScope::new("US", "999", "20260101_000000");
        assert_eq!(unknown.category_name, "Unknown");
    }
}
