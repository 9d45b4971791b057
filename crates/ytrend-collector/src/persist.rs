//! Best-effort persistence of a finished run.
//!
//! Each step is independent: a failure is logged and recorded in the
//! [`PersistReport`], and the remaining steps still run.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sqlx::SqlitePool;
use ytrend_db::NewQuotaUsage;

use crate::credentials::Credential;
use crate::orchestrator::CollectionRun;
use crate::snapshot::write_snapshot;

/// What [`persist_run`] managed to write.
#[derive(Debug, Default)]
pub struct PersistReport {
    pub snapshot_path: Option<PathBuf>,
    pub rows_upserted: Option<u64>,
    pub stats_recorded: bool,
    pub usage_rows_recorded: usize,
    /// One human-readable line per failed step.
    pub failures: Vec<String>,
}

impl PersistReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes the snapshot, upserts items, and appends the stats row and one
/// quota-usage row per credential used. Never returns an error.
pub async fn persist_run(
    pool: &SqlitePool,
    data_dir: &Path,
    run: &CollectionRun,
) -> PersistReport {
    let mut report = PersistReport::default();
    let batch_id = run.summary.batch_id.as_str();

    match write_snapshot(data_dir, run).await {
        Ok(path) => {
            tracing::info!(batch_id, path = %path.display(), "snapshot written");
            report.snapshot_path = Some(path);
        }
        Err(e) => {
            tracing::error!(batch_id, error = %e, "failed to write snapshot");
            report.failures.push(format!("snapshot: {e}"));
        }
    }

    match ytrend_db::upsert_trending_items(pool, &run.items).await {
        Ok(rows) => {
            tracing::info!(batch_id, rows, "trending videos upserted");
            report.rows_upserted = Some(rows);
        }
        Err(e) => {
            tracing::error!(batch_id, error = %e, "failed to upsert trending videos");
            report.failures.push(format!("upsert: {e}"));
        }
    }

    match ytrend_db::insert_collection_stats(pool, &run.summary).await {
        Ok(_) => report.stats_recorded = true,
        Err(e) => {
            tracing::error!(batch_id, error = %e, "failed to record collection stats");
            report.failures.push(format!("collection stats: {e}"));
        }
    }

    let usage_date = run.summary.collected_at.date_naive();
    for usage in &run.usage {
        let record = NewQuotaUsage {
            credential_fingerprint: &usage.fingerprint,
            usage_date,
            requests_made: usage.requests_made,
            quota_used: usage.quota_used,
            daily_limit: usage.daily_limit,
            region_code: None,
            category_id: None,
            batch_id: Some(batch_id),
        };
        match ytrend_db::insert_quota_usage(pool, &record).await {
            Ok(_) => report.usage_rows_recorded += 1,
            Err(e) => {
                tracing::error!(
                    batch_id,
                    key_number = usage.index + 1,
                    fingerprint = %usage.fingerprint,
                    error = %e,
                    "failed to record quota usage"
                );
                report
                    .failures
                    .push(format!("quota usage for key {}: {e}", usage.index + 1));
            }
        }
    }

    report
}

/// Units already spent on `date` by each credential, read from the store.
///
/// Lookup failures are logged and read as zero so a store outage never
/// blocks collection.
pub async fn hydrate_quota_seeds(
    pool: &SqlitePool,
    credentials: &[Credential],
    date: NaiveDate,
) -> Vec<u64> {
    let mut seeds = Vec::with_capacity(credentials.len());
    for (idx, credential) in credentials.iter().enumerate() {
        let used = match ytrend_db::quota_used_on(pool, credential.fingerprint(), date).await {
            Ok(used) => used,
            Err(e) => {
                tracing::warn!(
                    key_number = idx + 1,
                    fingerprint = %credential.fingerprint(),
                    error = %e,
                    "could not read persisted quota usage; assuming none"
                );
                0
            }
        };
        seeds.push(used);
    }
    seeds
}
