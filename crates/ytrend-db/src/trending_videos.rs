//! Database operations for `trending_videos`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use ytrend_core::TrendingItem;

use crate::{to_i64, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `trending_videos` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendingVideoRow {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub category_id: String,
    pub category_name: String,
    pub region_code: String,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub duration: String,
    /// JSON array text; see [`TrendingVideoRow::tag_list`].
    pub tags: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub engagement_rate: f64,
    pub trending_rank: i64,
    pub collected_at: DateTime<Utc>,
    pub batch_id: String,
}

impl TrendingVideoRow {
    /// Decodes the stored tag list. A corrupt value reads as no tags.
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_default()
    }
}

const SELECT_COLUMNS: &str = "video_id, title, channel_id, channel_title, published_at, \
     category_id, category_name, region_code, view_count, like_count, comment_count, \
     duration, tags, description, thumbnail_url, engagement_rate, trending_rank, \
     collected_at, batch_id";

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Upserts a batch of items keyed by `video_id` inside one transaction.
///
/// A row that already exists is overwritten with the newer observation
/// (last write wins). Items with an empty `video_id` are skipped. Returns the
/// number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Encode`] if a counter does not fit in an `INTEGER` or
/// tags cannot be serialized, and [`DbError::Sqlx`] if any statement fails.
/// On error the transaction is rolled back and nothing is written.
pub async fn upsert_trending_items(
    pool: &SqlitePool,
    items: &[TrendingItem],
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut written = 0u64;

    for item in items.iter().filter(|i| !i.video_id.is_empty()) {
        let tags = serde_json::to_string(&item.tags).map_err(|e| DbError::Encode {
            field: "tags",
            reason: e.to_string(),
        })?;

        let result = sqlx::query(
            "INSERT INTO trending_videos (\
                 video_id, title, channel_id, channel_title, published_at, \
                 category_id, category_name, region_code, view_count, like_count, \
                 comment_count, duration, tags, description, thumbnail_url, \
                 engagement_rate, trending_rank, collected_at, batch_id, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP) \
             ON CONFLICT (video_id) DO UPDATE SET \
                 title = excluded.title, \
                 channel_id = excluded.channel_id, \
                 channel_title = excluded.channel_title, \
                 published_at = excluded.published_at, \
                 category_id = excluded.category_id, \
                 category_name = excluded.category_name, \
                 region_code = excluded.region_code, \
                 view_count = excluded.view_count, \
                 like_count = excluded.like_count, \
                 comment_count = excluded.comment_count, \
                 duration = excluded.duration, \
                 tags = excluded.tags, \
                 description = excluded.description, \
                 thumbnail_url = excluded.thumbnail_url, \
                 engagement_rate = excluded.engagement_rate, \
                 trending_rank = excluded.trending_rank, \
                 collected_at = excluded.collected_at, \
                 batch_id = excluded.batch_id, \
                 updated_at = CURRENT_TIMESTAMP",
        )
        .bind(&item.video_id)
        .bind(&item.title)
        .bind(&item.channel_id)
        .bind(&item.channel_title)
        .bind(item.published_at)
        .bind(&item.category_id)
        .bind(&item.category_name)
        .bind(&item.region_code)
        .bind(to_i64("view_count", item.view_count)?)
        .bind(to_i64("like_count", item.like_count)?)
        .bind(to_i64("comment_count", item.comment_count)?)
        .bind(&item.duration)
        .bind(tags)
        .bind(&item.description)
        .bind(&item.thumbnail_url)
        .bind(item.engagement_rate)
        .bind(i64::from(item.trending_rank))
        .bind(item.collected_at)
        .bind(&item.batch_id)
        .execute(&mut *tx)
        .await?;

        written += result.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}

/// Returns rows collected at or after `since`, newest first and by rank
/// within a collection instant.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trending_videos_since(
    pool: &SqlitePool,
    since: DateTime<Utc>,
) -> Result<Vec<TrendingVideoRow>, DbError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM trending_videos \
         WHERE collected_at >= ? \
         ORDER BY collected_at DESC, trending_rank ASC"
    );
    let rows = sqlx::query_as::<_, TrendingVideoRow>(&sql)
        .bind(since)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Fetches a single row by video id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_trending_video(
    pool: &SqlitePool,
    video_id: &str,
) -> Result<Option<TrendingVideoRow>, DbError> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM trending_videos WHERE video_id = ?");
    let row = sqlx::query_as::<_, TrendingVideoRow>(&sql)
        .bind(video_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Total number of distinct videos in the store.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_trending_videos(pool: &SqlitePool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trending_videos")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
