//! Read-only commands: `status`, `history`, and the catalog listings.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use ytrend_collector::{fingerprint, QuotaTracker};
use ytrend_core::{AppConfig, CATEGORIES, REGIONS};

const RULE_WIDTH: usize = 72;

pub(crate) fn print_regions() {
    for row in REGIONS.chunks(10) {
        let line: Vec<String> = row.iter().map(|r| format!("{r:<4}")).collect();
        println!("{}", line.concat().trim_end());
    }
}

pub(crate) fn print_categories() {
    for (id, name) in CATEGORIES {
        println!("{id:<4}{name}");
    }
}

/// Print today's usage per configured key, as persisted in the store.
///
/// Keys are identified by their 1-based position and fingerprint; the key
/// itself is never printed.
///
/// # Errors
///
/// Returns an error if the usage query fails.
pub(crate) async fn run_status(pool: &SqlitePool, config: &AppConfig) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();

    if config.youtube_api_keys.is_empty() {
        println!("no YouTube API keys configured; set YOUTUBE_API_KEY");
        return Ok(());
    }

    let rows = ytrend_db::list_quota_usage_on(pool, today).await?;

    println!("Quota usage for {today} (UTC), daily limit {}", config.daily_quota_limit);
    println!(
        "{:<5}{:<18}{:>10}{:>10}{:>11}  READY",
        "KEY", "FINGERPRINT", "REQUESTS", "USED", "REMAINING"
    );
    for (idx, key) in config.youtube_api_keys.iter().enumerate() {
        let fp = fingerprint(key);
        let (requests, used) = rows
            .iter()
            .filter(|r| r.credential_fingerprint == fp)
            .fold((0_i64, 0_i64), |(req, used), r| {
                (req + r.requests_made, used + r.quota_used)
            });
        let tracker =
            QuotaTracker::seeded(config.daily_quota_limit, u64::try_from(used).unwrap_or(0));
        println!(
            "{:<5}{:<18}{:>10}{:>10}{:>11}  {}",
            format!("#{}", idx + 1),
            fp,
            requests,
            tracker.consumed(),
            tracker.remaining(),
            if tracker.can_proceed(ytrend_collector::VIDEOS_LIST_COST) {
                "yes"
            } else {
                "no"
            }
        );
    }

    Ok(())
}

/// Print collection runs from the last `days` days, newest first.
///
/// # Errors
///
/// Returns an error if the stats query fails.
pub(crate) async fn run_history(pool: &SqlitePool, days: u32) -> anyhow::Result<()> {
    let since = Utc::now() - Duration::days(i64::from(days));
    let runs = ytrend_db::list_collection_stats_since(pool, since).await?;

    if runs.is_empty() {
        println!("no collection runs in the last {days} days; run `ytrend collect` first");
        return Ok(());
    }

    println!("Collection history (last {days} days)");
    println!("{}", "=".repeat(RULE_WIDTH));
    println!(
        "{:<18}{:<18}{:>8}{:>9}{:>9}{:>10}",
        "BATCH", "DATE", "VIDEOS", "REGIONS", "SUCCESS", "TIME"
    );
    println!("{}", "-".repeat(RULE_WIDTH));
    for run in &runs {
        println!(
            "{:<18}{:<18}{:>8}{:>9}{:>8.1}%{:>9.1}s",
            run.batch_id,
            run.run_date.format("%Y-%m-%d %H:%M"),
            run.total_videos,
            format!("{}/{}", run.regions_processed, run.regions_attempted),
            run.success_rate,
            run.processing_time_seconds,
        );
    }
    println!("{}", "=".repeat(RULE_WIDTH));

    Ok(())
}
