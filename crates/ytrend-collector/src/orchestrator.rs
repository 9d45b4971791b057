//! Region × category sweep with quota rotation and per-region isolation.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use ytrend_core::{AppConfig, CollectionSummary, TrendingItem, CATEGORIES, REGIONS};

use crate::credentials::{Connector, CredentialRotator, CredentialUsage};
use crate::error::CollectError;
use crate::fetcher::{fetch_trending, FetchRequest};
use crate::quota::VIDEOS_LIST_COST;

/// What one run should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPlan {
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    /// Per (region, category) chart.
    pub max_results: u32,
}

impl CollectionPlan {
    #[must_use]
    pub fn new(regions: Vec<String>, categories: Vec<String>, max_results: u32) -> Self {
        Self {
            regions,
            categories,
            max_results,
        }
    }

    /// Every catalog region and category.
    #[must_use]
    pub fn full_catalog(max_results: u32) -> Self {
        Self::new(
            REGIONS.iter().map(|r| (*r).to_string()).collect(),
            CATEGORIES.iter().map(|(id, _)| (*id).to_string()).collect(),
            max_results,
        )
    }
}

/// Pacing between charts. The page delay inside a chart is fixed.
#[derive(Debug, Clone, Copy)]
pub struct CollectorSettings {
    pub inter_category_delay: Duration,
    pub inter_region_delay: Duration,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            inter_category_delay: Duration::from_millis(500),
            inter_region_delay: Duration::from_millis(1_000),
        }
    }
}

impl CollectorSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            inter_category_delay: Duration::from_millis(config.inter_category_delay_ms),
            inter_region_delay: Duration::from_millis(config.inter_region_delay_ms),
        }
    }
}

/// Everything a finished run hands to persistence.
#[derive(Debug, Clone)]
pub struct CollectionRun {
    pub summary: CollectionSummary,
    pub items: Vec<TrendingItem>,
    /// One entry per credential used; never empty.
    pub usage: Vec<CredentialUsage>,
}

/// `YYYYMMDD_HHMMSS` in UTC.
#[must_use]
pub fn batch_id_for(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Result of sweeping the categories of one region.
#[derive(Debug, Default)]
struct RegionSweep {
    items: Vec<TrendingItem>,
    categories_processed: usize,
}

pub struct Collector<C: Connector> {
    rotator: CredentialRotator<C>,
    settings: CollectorSettings,
}

impl<C: Connector> Collector<C> {
    #[must_use]
    pub fn new(rotator: CredentialRotator<C>, settings: CollectorSettings) -> Self {
        Self { rotator, settings }
    }

    #[must_use]
    pub fn rotator(&self) -> &CredentialRotator<C> {
        &self.rotator
    }

    /// Resets per-credential usage to `seeds`, typically re-read from the
    /// store before a scheduled run.
    pub fn reseed(&mut self, seeds: &[u64]) {
        self.rotator.reseed(seeds);
    }

    /// Runs one full sweep. Never fails: per-region errors are counted in the
    /// summary and the sweep moves on.
    pub async fn collect(&mut self, plan: &CollectionPlan) -> CollectionRun {
        let started = Instant::now();
        let collected_at = Utc::now();
        let batch_id = batch_id_for(collected_at);

        tracing::info!(
            batch_id = %batch_id,
            regions = plan.regions.len(),
            categories = plan.categories.len(),
            max_results = plan.max_results,
            keys = self.rotator.len(),
            "starting trending collection"
        );

        let mut items = Vec::new();
        let mut errors = 0usize;
        let mut regions_processed = 0usize;
        let mut categories_processed = 0usize;

        for (idx, region) in plan.regions.iter().enumerate() {
            if idx > 0 && !self.settings.inter_region_delay.is_zero() {
                tokio::time::sleep(self.settings.inter_region_delay).await;
            }

            // Each failed attempt counts one error; a region is retried at
            // most once, and only after a successful rotation.
            let result = match self.sweep_region(region, plan, &batch_id, &mut errors).await {
                Ok(sweep) => Ok(sweep),
                Err(e) if e.is_upstream_quota() => {
                    errors += 1;
                    tracing::warn!(region = %region, error = %e, "quota exceeded during region");
                    if self.rotator.rotate() {
                        tracing::info!(region = %region, "retrying region with next API key");
                        let retry = self.sweep_region(region, plan, &batch_id, &mut errors).await;
                        if let Err(e) = &retry {
                            errors += uncounted_errors(e);
                        }
                        retry
                    } else {
                        Err(e)
                    }
                }
                Err(e) => {
                    errors += uncounted_errors(&e);
                    Err(e)
                }
            };

            match result {
                Ok(sweep) => {
                    tracing::info!(
                        region = %region,
                        items = sweep.items.len(),
                        categories = sweep.categories_processed,
                        "region collected"
                    );
                    regions_processed += 1;
                    categories_processed += sweep.categories_processed;
                    items.extend(sweep.items);
                }
                Err(e) => {
                    tracing::error!(region = %region, error = %e, "region failed");
                }
            }
        }

        let usage = self.rotator.take_usage();
        let regions_attempted = plan.regions.len();
        let summary = CollectionSummary {
            batch_id,
            collected_at,
            total_videos_collected: items.len(),
            regions_attempted,
            regions_processed,
            categories_processed,
            api_requests_made: usage.iter().map(|u| u.requests_made).sum(),
            quota_used: usage.iter().map(|u| u.quota_used).sum(),
            errors,
            processing_time_seconds: started.elapsed().as_secs_f64(),
            success_rate: success_rate(regions_processed, regions_attempted),
        };

        tracing::info!(
            batch_id = %summary.batch_id,
            videos = summary.total_videos_collected,
            regions_processed = summary.regions_processed,
            regions_attempted = summary.regions_attempted,
            errors = summary.errors,
            quota_used = summary.quota_used,
            "trending collection finished"
        );

        CollectionRun {
            summary,
            items,
            usage,
        }
    }

    /// Collects every planned category of one region.
    ///
    /// Transient category failures bump `errors` and keep their partial
    /// items. An upstream quota rejection aborts the sweep and discards what
    /// the region had gathered. When local quota runs out and no other key
    /// has room, the sweep stops: with items it returns them, without any it
    /// fails with [`CollectError::QuotaExhausted`]. A region where every
    /// category was interrupted and nothing was kept fails with
    /// [`CollectError::RegionFailed`].
    async fn sweep_region(
        &mut self,
        region: &str,
        plan: &CollectionPlan,
        batch_id: &str,
        errors: &mut usize,
    ) -> Result<RegionSweep, CollectError> {
        let mut sweep = RegionSweep::default();

        for (idx, category) in plan.categories.iter().enumerate() {
            if idx > 0 && !self.settings.inter_category_delay.is_zero() {
                tokio::time::sleep(self.settings.inter_category_delay).await;
            }

            if !self.rotator.ensure_capacity(VIDEOS_LIST_COST) {
                if sweep.items.is_empty() {
                    return Err(CollectError::QuotaExhausted {
                        region: region.to_string(),
                        message: "no API key has quota left today".to_string(),
                    });
                }
                tracing::warn!(
                    region,
                    category = %category,
                    kept = sweep.items.len(),
                    "quota exhausted on every key; stopping region with partial results"
                );
                return Ok(sweep);
            }

            let request = FetchRequest {
                region_code: region,
                category_id: category,
                max_results: plan.max_results,
                batch_id,
            };
            let active = self.rotator.active_mut();
            let outcome = fetch_trending(&active.source, &mut active.tracker, &request).await?;

            if let Some(reason) = &outcome.interrupted {
                *errors += 1;
                tracing::warn!(
                    region,
                    category = %category,
                    kept = outcome.items.len(),
                    reason = %reason,
                    "category incomplete"
                );
            } else {
                sweep.categories_processed += 1;
            }
            sweep.items.extend(outcome.items);
        }

        if !plan.categories.is_empty() && sweep.categories_processed == 0 && sweep.items.is_empty()
        {
            return Err(CollectError::RegionFailed {
                region: region.to_string(),
                failed: plan.categories.len(),
            });
        }

        Ok(sweep)
    }
}

/// Errors a failed region adds on top of those already counted per category.
fn uncounted_errors(err: &CollectError) -> usize {
    match err {
        CollectError::RegionFailed { .. } => 0,
        _ => 1,
    }
}

#[allow(clippy::cast_precision_loss)]
fn success_rate(processed: usize, attempted: usize) -> f64 {
    if attempted == 0 {
        return 0.0;
    }
    processed as f64 / attempted as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn batch_id_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(batch_id_for(at), "20260307_090501");
    }

    #[test]
    fn success_rate_handles_empty_plan() {
        assert!(success_rate(0, 0).abs() < f64::EPSILON);
        assert!((success_rate(1, 2) - 50.0).abs() < 1e-9);
        assert!((success_rate(3, 3) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn full_catalog_plan_covers_everything() {
        let plan = CollectionPlan::full_catalog(50);
        assert_eq!(plan.regions.len(), REGIONS.len());
        assert_eq!(plan.categories.len(), CATEGORIES.len());
        assert_eq!(plan.max_results, 50);
    }
}
