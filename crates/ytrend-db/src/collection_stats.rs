//! Database operations for the append-only `collection_stats` table.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use ytrend_core::CollectionSummary;

use crate::{to_i64, DbError};

/// A row from the `collection_stats` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollectionStatsRow {
    pub id: i64,
    pub batch_id: String,
    pub run_date: DateTime<Utc>,
    pub total_videos: i64,
    pub regions_attempted: i64,
    pub regions_processed: i64,
    pub categories_processed: i64,
    pub api_requests_made: i64,
    pub quota_used: i64,
    pub errors: i64,
    pub processing_time_seconds: f64,
    pub success_rate: f64,
}

fn count(field: &'static str, value: usize) -> Result<i64, DbError> {
    to_i64(field, u64::try_from(value).unwrap_or(u64::MAX))
}

/// Appends the statistics row for one run.
///
/// # Errors
///
/// Returns [`DbError::Encode`] if a counter exceeds `i64::MAX`, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_collection_stats(
    pool: &SqlitePool,
    summary: &CollectionSummary,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO collection_stats (\
             batch_id, run_date, total_videos, regions_attempted, regions_processed, \
             categories_processed, api_requests_made, quota_used, errors, \
             processing_time_seconds, success_rate) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         RETURNING id",
    )
    .bind(&summary.batch_id)
    .bind(summary.collected_at)
    .bind(count("total_videos", summary.total_videos_collected)?)
    .bind(count("regions_attempted", summary.regions_attempted)?)
    .bind(count("regions_processed", summary.regions_processed)?)
    .bind(count("categories_processed", summary.categories_processed)?)
    .bind(to_i64("api_requests_made", summary.api_requests_made)?)
    .bind(to_i64("quota_used", summary.quota_used)?)
    .bind(count("errors", summary.errors)?)
    .bind(summary.processing_time_seconds)
    .bind(summary.success_rate)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Runs started at or after `since`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_collection_stats_since(
    pool: &SqlitePool,
    since: DateTime<Utc>,
) -> Result<Vec<CollectionStatsRow>, DbError> {
    let rows = sqlx::query_as::<_, CollectionStatsRow>(
        "SELECT id, batch_id, run_date, total_videos, regions_attempted, regions_processed, \
                categories_processed, api_requests_made, quota_used, errors, \
                processing_time_seconds, success_rate \
         FROM collection_stats \
         WHERE run_date >= ? \
         ORDER BY run_date DESC, id DESC",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
