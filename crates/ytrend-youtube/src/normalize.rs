//! Normalization of `videos.list` resources into [`TrendingItem`]s.

use chrono::{DateTime, Utc};
use ytrend_core::{
    engagement_rate, truncate_chars, CollectionScope, TrendingItem, DESCRIPTION_MAX_CHARS,
};

use crate::error::NormalizeError;
use crate::types::{Count, Thumbnails, Video};

/// Parses an RFC 3339 timestamp into UTC. Unparseable values become `None`.
#[must_use]
pub fn parse_published_at(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Picks the best available thumbnail: high, then medium, then default.
#[must_use]
pub fn best_thumbnail(thumbnails: &Thumbnails) -> Option<String> {
    thumbnails
        .high
        .as_ref()
        .or(thumbnails.medium.as_ref())
        .or(thumbnails.default_size.as_ref())
        .map(|t| t.url.clone())
}

/// Largest counter the store can hold (`SQLite` integers are signed 64-bit).
const MAX_STORABLE_COUNT: u64 = i64::MAX.unsigned_abs();

/// An absent counter is zero; a present one must be a non-negative integer
/// no larger than [`MAX_STORABLE_COUNT`].
fn count_value(
    count: Option<&Count>,
    video_id: &str,
    field: &'static str,
) -> Result<u64, NormalizeError> {
    match count {
        None => Ok(0),
        Some(c) => c
            .value()
            .filter(|n| *n <= MAX_STORABLE_COUNT)
            .ok_or_else(|| NormalizeError::InvalidCount {
                video_id: video_id.to_string(),
                field,
                value: match c {
                    Count::Number(n) => n.to_string(),
                    Count::Text(s) => s.clone(),
                },
            }),
    }
}

/// Converts one API video into a [`TrendingItem`] at position `rank` in the
/// chart described by `scope`.
///
/// The category recorded is the one that was requested, not the video's own
/// `snippet.categoryId`, so each item is attributable to the chart it came from.
///
/// # Errors
///
/// Returns [`NormalizeError::MissingId`] for a blank id, or
/// [`NormalizeError::InvalidCount`] if a statistics counter is not a
/// non-negative integer.
pub fn normalize_video(
    video: &Video,
    rank: u32,
    scope: &CollectionScope,
) -> Result<TrendingItem, NormalizeError> {
    let video_id = video.id.trim();
    if video_id.is_empty() {
        return Err(NormalizeError::MissingId);
    }

    let stats = &video.statistics;
    let view_count = count_value(stats.view_count.as_ref(), video_id, "viewCount")?;
    let like_count = count_value(stats.like_count.as_ref(), video_id, "likeCount")?;
    let comment_count = count_value(stats.comment_count.as_ref(), video_id, "commentCount")?;

    let snippet = &video.snippet;
    Ok(TrendingItem {
        video_id: video_id.to_string(),
        title: snippet.title.clone(),
        channel_id: snippet.channel_id.clone(),
        channel_title: snippet.channel_title.clone(),
        published_at: snippet.published_at.as_deref().and_then(parse_published_at),
        category_id: scope.category_id.clone(),
        category_name: scope.category_name.clone(),
        region_code: scope.region_code.clone(),
        view_count,
        like_count,
        comment_count,
        duration: video.content_details.duration.clone().unwrap_or_default(),
        tags: snippet.tags.clone(),
        description: truncate_chars(&snippet.description, DESCRIPTION_MAX_CHARS),
        thumbnail_url: best_thumbnail(&snippet.thumbnails),
        engagement_rate: engagement_rate(view_count, like_count, comment_count),
        trending_rank: rank,
        collected_at: scope.collected_at,
        batch_id: scope.batch_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn scope() -> CollectionScope {
        CollectionScope::new("GB", "10", "20261019_120000")
    }

    fn video(json: &str) -> Video {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn normalizes_full_video() {
        let v = video(
            r#"{
                "id": "dQw4w9WgXcQ",
                "snippet": {
                    "publishedAt": "2026-10-18T14:00:07Z",
                    "channelId": "UC123",
                    "title": "Song",
                    "description": "A song",
                    "channelTitle": "Singer",
                    "tags": ["pop", "music"],
                    "categoryId": "24",
                    "thumbnails": {
                        "default": {"url": "https://i.ytimg.com/d.jpg"},
                        "medium": {"url": "https://i.ytimg.com/m.jpg"}
                    }
                },
                "statistics": {"viewCount": "1000", "likeCount": "40", "commentCount": "10"},
                "contentDetails": {"duration": "PT3M33S"}
            }"#,
        );
        let s = scope();
        let item = normalize_video(&v, 3, &s).unwrap();

        assert_eq!(item.video_id, "dQw4w9WgXcQ");
        assert_eq!(item.region_code, "GB");
        assert_eq!(item.category_id, "10", "requested category wins over snippet");
        assert_eq!(item.category_name, "Music");
        assert_eq!(item.trending_rank, 3);
        assert_eq!(item.view_count, 1000);
        assert!((item.engagement_rate - 5.0).abs() < 1e-9);
        assert_eq!(item.duration, "PT3M33S");
        assert_eq!(item.tags, vec!["pop", "music"]);
        assert_eq!(item.thumbnail_url.as_deref(), Some("https://i.ytimg.com/m.jpg"));
        assert_eq!(
            item.published_at,
            Some(Utc.with_ymd_and_hms(2026, 10, 18, 14, 0, 7).unwrap())
        );
        assert_eq!(item.batch_id, s.batch_id);
        assert_eq!(item.collected_at, s.collected_at);
    }

    #[test]
    fn missing_statistics_default_to_zero() {
        let item = normalize_video(&video(r#"{"id":"abc"}"#), 1, &scope()).unwrap();
        assert_eq!(item.view_count, 0);
        assert_eq!(item.like_count, 0);
        assert_eq!(item.comment_count, 0);
        assert!(item.engagement_rate.abs() < f64::EPSILON);
        assert!(item.thumbnail_url.is_none());
        assert!(item.published_at.is_none());
        assert_eq!(item.duration, "");
    }

    #[test]
    fn non_numeric_count_is_rejected() {
        let err = normalize_video(
            &video(r#"{"id":"abc","statistics":{"viewCount":"many"}}"#),
            1,
            &scope(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::InvalidCount {
                video_id: "abc".to_string(),
                field: "viewCount",
                value: "many".to_string(),
            }
        );
    }

    #[test]
    fn count_beyond_signed_range_is_rejected() {
        let err = normalize_video(
            &video(r#"{"id":"abc","statistics":{"likeCount":"10000000000000000000"}}"#),
            1,
            &scope(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::InvalidCount { field: "likeCount", .. }
        ));

        let at_limit = format!(r#"{{"id":"abc","statistics":{{"viewCount":"{}"}}}}"#, i64::MAX);
        let item = normalize_video(&video(&at_limit), 1, &scope()).unwrap();
        assert_eq!(item.view_count, MAX_STORABLE_COUNT);
    }

    #[test]
    fn blank_id_is_rejected() {
        let err = normalize_video(&video(r#"{"id":"  "}"#), 1, &scope()).unwrap_err();
        assert_eq!(err, NormalizeError::MissingId);
    }

    #[test]
    fn long_description_is_truncated() {
        let mut v = video(r#"{"id":"abc"}"#);
        v.snippet.description = "x".repeat(DESCRIPTION_MAX_CHARS * 2);
        let item = normalize_video(&v, 1, &scope()).unwrap();
        assert_eq!(item.description.chars().count(), DESCRIPTION_MAX_CHARS);
    }

    #[test]
    fn high_thumbnail_preferred() {
        let v = video(
            r#"{"id":"a","snippet":{"thumbnails":{
                "default":{"url":"d"},"medium":{"url":"m"},"high":{"url":"h"}}}}"#,
        );
        assert_eq!(best_thumbnail(&v.snippet.thumbnails).as_deref(), Some("h"));
    }

    #[test]
    fn invalid_published_at_becomes_none() {
        assert!(parse_published_at("yesterday").is_none());
        assert!(parse_published_at("2026-10-18T14:00:07+02:00").is_some());
    }
}
