//! Database operations for the append-only `quota_usage` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::{to_i64, to_u64, DbError};

/// A row from the `quota_usage` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuotaUsageRow {
    pub id: i64,
    pub credential_fingerprint: String,
    pub usage_date: NaiveDate,
    pub requests_made: i64,
    pub quota_used: i64,
    pub daily_limit: i64,
    pub region_code: Option<String>,
    pub category_id: Option<String>,
    pub batch_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Values for a new `quota_usage` row.
#[derive(Debug, Clone)]
pub struct NewQuotaUsage<'a> {
    pub credential_fingerprint: &'a str,
    pub usage_date: NaiveDate,
    pub requests_made: u64,
    pub quota_used: u64,
    pub daily_limit: u64,
    pub region_code: Option<&'a str>,
    pub category_id: Option<&'a str>,
    pub batch_id: Option<&'a str>,
}

/// Appends one usage record. Rows are never updated.
///
/// # Errors
///
/// Returns [`DbError::Encode`] if a counter exceeds `i64::MAX`, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_quota_usage(
    pool: &SqlitePool,
    usage: &NewQuotaUsage<'_>,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO quota_usage (\
             credential_fingerprint, usage_date, requests_made, quota_used, daily_limit, \
             region_code, category_id, batch_id, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
         RETURNING id",
    )
    .bind(usage.credential_fingerprint)
    .bind(usage.usage_date)
    .bind(to_i64("requests_made", usage.requests_made)?)
    .bind(to_i64("quota_used", usage.quota_used)?)
    .bind(to_i64("daily_limit", usage.daily_limit)?)
    .bind(usage.region_code)
    .bind(usage.category_id)
    .bind(usage.batch_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Sum of quota units recorded for `fingerprint` on `date`.
///
/// Used to seed a fresh tracker after a restart. Returns 0 when nothing was
/// recorded.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn quota_used_on(
    pool: &SqlitePool,
    fingerprint: &str,
    date: NaiveDate,
) -> Result<u64, DbError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(quota_used), 0) FROM quota_usage \
         WHERE credential_fingerprint = ? AND usage_date = ?",
    )
    .bind(fingerprint)
    .bind(date)
    .fetch_one(pool)
    .await?;

    Ok(to_u64(total))
}

/// All usage rows for `date`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_quota_usage_on(
    pool: &SqlitePool,
    date: NaiveDate,
) -> Result<Vec<QuotaUsageRow>, DbError> {
    let rows = sqlx::query_as::<_, QuotaUsageRow>(
        "SELECT id, credential_fingerprint, usage_date, requests_made, quota_used, \
                daily_limit, region_code, category_id, batch_id, created_at \
         FROM quota_usage WHERE usage_date = ? ORDER BY id ASC",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
