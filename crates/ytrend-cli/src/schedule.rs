//! `schedule` command: run the collect cycle on a cron schedule.
//!
//! One [`Collector`] is shared by every firing behind an async mutex, so a
//! firing that starts while the previous one is still running waits for it.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use ytrend_collector::{
    hydrate_quota_seeds, CollectionPlan, Collector, Credential, YoutubeConnector,
};
use ytrend_core::AppConfig;

use crate::collect::{build_collector, run_cycle};

/// Handler for `ytrend schedule`. Blocks until Ctrl-C.
///
/// # Errors
///
/// Returns an error if no API keys are configured, the cron expression is
/// invalid, or the scheduler cannot be started.
pub(crate) async fn run_schedule(
    pool: SqlitePool,
    config: AppConfig,
    plan: CollectionPlan,
    cron: &str,
) -> anyhow::Result<()> {
    let collector = build_collector(&pool, &config).await?;
    let collector = Arc::new(Mutex::new(collector));
    let config = Arc::new(config);
    let plan = Arc::new(plan);

    let mut scheduler = JobScheduler::new().await?;

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = pool.clone();
        let config = Arc::clone(&config);
        let plan = Arc::clone(&plan);
        let collector = Arc::clone(&collector);

        Box::pin(async move {
            let mut collector = collector.lock().await;
            tracing::info!("scheduler: starting trending collection");
            run_scheduled_cycle(&pool, &config, &mut collector, &plan).await;
        })
    })
    .map_err(|e| anyhow::anyhow!("invalid cron expression '{cron}': {e}"))?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    println!("scheduled collection with cron '{cron}' (UTC); press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    tracing::info!("scheduler: shutdown requested");
    scheduler.shutdown().await?;
    Ok(())
}

async fn run_scheduled_cycle(
    pool: &SqlitePool,
    config: &AppConfig,
    collector: &mut Collector<YoutubeConnector>,
    plan: &CollectionPlan,
) {
    // Usage may have been written by another process since the last firing,
    // and the UTC day may have rolled over.
    let credentials: Vec<Credential> = config
        .youtube_api_keys
        .iter()
        .map(|k| Credential::new(k.as_str()))
        .collect();
    let seeds = hydrate_quota_seeds(pool, &credentials, Utc::now().date_naive()).await;
    collector.reseed(&seeds);

    let (run, report) = run_cycle(pool, config, collector, plan).await;
    let s = &run.summary;
    tracing::info!(
        batch_id = %s.batch_id,
        videos = s.total_videos_collected,
        regions_processed = s.regions_processed,
        regions_attempted = s.regions_attempted,
        errors = s.errors,
        quota_used = s.quota_used,
        persist_failures = report.failures.len(),
        "scheduler: trending collection complete"
    );
}
