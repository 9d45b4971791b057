//! `collect` command: one sweep of the configured charts, then persistence.
//!
//! Per-region failures never fail the command; they show up in the printed
//! summary. Only bad arguments, missing credentials and an unreachable store
//! surface as errors.

use chrono::Utc;
use sqlx::SqlitePool;
use ytrend_collector::{
    hydrate_quota_seeds, persist_run, CollectionPlan, CollectionRun, Collector, CollectorSettings,
    Credential, CredentialRotator, PersistReport, YoutubeConnector, VIDEOS_LIST_COST,
};
use ytrend_core::{is_known_category, is_known_region, AppConfig, CATEGORIES, REGIONS};
use ytrend_youtube::MAX_PAGE_SIZE;

use crate::ScopeArgs;

/// Turn CLI scope flags into a [`CollectionPlan`].
///
/// Empty lists fall back to the full catalog. Region codes are upper-cased;
/// duplicates are dropped keeping first occurrence.
///
/// # Errors
///
/// Returns an error naming the first code that is not in the catalog, or if
/// `--max-results` is zero.
pub(crate) fn resolve_plan(scope: &ScopeArgs) -> anyhow::Result<CollectionPlan> {
    if scope.max_results == 0 {
        anyhow::bail!("--max-results must be at least 1");
    }

    let regions = if scope.regions.is_empty() {
        REGIONS.iter().map(|r| (*r).to_string()).collect()
    } else {
        let mut regions: Vec<String> = Vec::with_capacity(scope.regions.len());
        for raw in &scope.regions {
            let code = raw.trim().to_ascii_uppercase();
            if !is_known_region(&code) {
                anyhow::bail!(
                    "unknown region '{raw}'; run `ytrend list-regions` for valid codes"
                );
            }
            if !regions.contains(&code) {
                regions.push(code);
            }
        }
        regions
    };

    let categories = if scope.categories.is_empty() {
        CATEGORIES.iter().map(|(id, _)| (*id).to_string()).collect()
    } else {
        let mut categories: Vec<String> = Vec::with_capacity(scope.categories.len());
        for raw in &scope.categories {
            let id = raw.trim().to_string();
            if !is_known_category(&id) {
                anyhow::bail!(
                    "unknown category '{raw}'; run `ytrend list-categories` for valid ids"
                );
            }
            if !categories.contains(&id) {
                categories.push(id);
            }
        }
        categories
    };

    Ok(CollectionPlan::new(regions, categories, scope.max_results))
}

/// Worst-case number of list requests the plan can issue.
pub(crate) fn max_requests(plan: &CollectionPlan) -> u64 {
    let per_chart = u64::from(plan.max_results.div_ceil(MAX_PAGE_SIZE));
    (plan.regions.len() as u64) * (plan.categories.len() as u64) * per_chart
}

pub(crate) fn print_dry_run(config: &AppConfig, plan: &CollectionPlan) {
    let requests = max_requests(plan);
    println!("[dry-run] regions:    {}", plan.regions.join(","));
    println!("[dry-run] categories: {}", plan.categories.join(","));
    println!("[dry-run] max results per chart: {}", plan.max_results);
    println!(
        "[dry-run] at most {requests} requests ({} quota units)",
        requests * VIDEOS_LIST_COST
    );
    println!(
        "[dry-run] {} API key(s) configured, daily limit {} each",
        config.youtube_api_keys.len(),
        config.daily_quota_limit
    );
}

/// Build a collector from configuration, seeding each key's tracker with
/// the usage already persisted for today.
///
/// # Errors
///
/// Returns an error if no API keys are configured.
pub(crate) async fn build_collector(
    pool: &SqlitePool,
    config: &AppConfig,
) -> anyhow::Result<Collector<YoutubeConnector>> {
    let keys = config.require_api_keys().map_err(|e| {
        anyhow::anyhow!("{e}; set YOUTUBE_API_KEY (and optionally YOUTUBE_API_KEY_1..9)")
    })?;

    let credentials: Vec<Credential> = keys
        .iter()
        .map(|k| Credential::new(k.as_str()))
        .collect();
    let seeds = hydrate_quota_seeds(pool, &credentials, Utc::now().date_naive()).await;

    let rotator = CredentialRotator::new(
        credentials,
        YoutubeConnector::from_app_config(config),
        config.daily_quota_limit,
        &seeds,
    )?;
    Ok(Collector::new(
        rotator,
        CollectorSettings::from_app_config(config),
    ))
}

/// Collect once and persist. Persistence failures are logged by
/// [`persist_run`] and reported, never returned.
pub(crate) async fn run_cycle(
    pool: &SqlitePool,
    config: &AppConfig,
    collector: &mut Collector<YoutubeConnector>,
    plan: &CollectionPlan,
) -> (CollectionRun, PersistReport) {
    let run = collector.collect(plan).await;
    let report = persist_run(pool, &config.data_dir, &run).await;
    (run, report)
}

/// Handler for `ytrend collect`.
///
/// # Errors
///
/// Returns an error if the collector cannot be built.
pub(crate) async fn run_collect(
    pool: &SqlitePool,
    config: &AppConfig,
    plan: &CollectionPlan,
) -> anyhow::Result<()> {
    let mut collector = build_collector(pool, config).await?;
    let (run, report) = run_cycle(pool, config, &mut collector, plan).await;
    print_summary(&run, &report);
    Ok(())
}

pub(crate) fn print_summary(run: &CollectionRun, report: &PersistReport) {
    let s = &run.summary;
    println!("Batch:              {}", s.batch_id);
    println!("Videos collected:   {}", s.total_videos_collected);
    println!(
        "Regions processed:  {}/{}",
        s.regions_processed, s.regions_attempted
    );
    println!("Categories done:    {}", s.categories_processed);
    println!("Success rate:       {:.1}%", s.success_rate);
    println!("Processing time:    {:.1}s", s.processing_time_seconds);
    println!("API requests:       {}", s.api_requests_made);
    println!("Quota used:         {}", s.quota_used);
    println!("Errors:             {}", s.errors);
    if let Some(path) = &report.snapshot_path {
        println!("Snapshot:           {}", path.display());
    }
    for failure in &report.failures {
        println!("warning: {failure}");
    }
}
