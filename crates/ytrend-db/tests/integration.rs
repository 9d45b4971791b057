//! Store tests against a throwaway file-backed `SQLite` database.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;
use ytrend_core::{AppConfig, CollectionSummary, Environment, TrendingItem};
use ytrend_db::{
    count_trending_videos, get_trending_video, insert_collection_stats, insert_quota_usage,
    list_collection_stats_since, list_quota_usage_on, list_trending_videos_since, quota_used_on,
    run_migrations, upsert_trending_items, NewQuotaUsage, PoolConfig,
};

async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("trending.db").display());
    let pool = ytrend_db::connect_pool(&url, PoolConfig::default())
        .await
        .expect("connect");
    run_migrations(&pool).await.expect("migrate");
    (dir, pool)
}

fn item(video_id: &str, rank: u32, batch_id: &str) -> TrendingItem {
    TrendingItem {
        video_id: video_id.to_string(),
        title: format!("title {video_id}"),
        channel_id: "UC1".to_string(),
        channel_title: "Channel".to_string(),
        published_at: Some(Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap()),
        category_id: "10".to_string(),
        category_name: "Music".to_string(),
        region_code: "US".to_string(),
        view_count: 1_000,
        like_count: 40,
        comment_count: 10,
        duration: "PT3M".to_string(),
        tags: vec!["one".to_string(), "two".to_string()],
        description: "desc".to_string(),
        thumbnail_url: None,
        engagement_rate: 5.0,
        trending_rank: rank,
        collected_at: Utc::now(),
        batch_id: batch_id.to_string(),
    }
}

fn summary(batch_id: &str, collected_at: chrono::DateTime<Utc>) -> CollectionSummary {
    CollectionSummary {
        batch_id: batch_id.to_string(),
        collected_at,
        total_videos_collected: 7,
        regions_attempted: 2,
        regions_processed: 1,
        categories_processed: 1,
        api_requests_made: 2,
        quota_used: 2,
        errors: 1,
        processing_time_seconds: 1.5,
        success_rate: 50.0,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "sqlite://x.db".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        data_dir: "./data".into(),
        youtube_api_keys: vec![],
        youtube_base_url: "https://example.test/".to_string(),
        daily_quota_limit: 10_000,
        request_timeout_secs: 30,
        user_agent: "ua".to_string(),
        max_retries: 2,
        retry_backoff_base_ms: 1_000,
        inter_category_delay_ms: 500,
        inter_region_delay_ms: 1_000,
        db_max_connections: 42,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let (_dir, pool) = test_pool().await;
    let applied_again = run_migrations(&pool).await.expect("second migrate");
    assert_eq!(applied_again, 0);
    ytrend_db::ping(&pool).await.expect("ping");
}

#[tokio::test]
async fn upsert_same_batch_twice_leaves_one_row_per_video() {
    let (_dir, pool) = test_pool().await;
    let batch = vec![item("a", 1, "b1"), item("b", 2, "b1"), item("c", 3, "b1")];

    upsert_trending_items(&pool, &batch).await.unwrap();
    upsert_trending_items(&pool, &batch).await.unwrap();

    assert_eq!(count_trending_videos(&pool).await.unwrap(), 3);
}

#[tokio::test]
async fn later_batch_overwrites_earlier_row() {
    let (_dir, pool) = test_pool().await;
    upsert_trending_items(&pool, &[item("a", 5, "b1")]).await.unwrap();

    let mut newer = item("a", 1, "b2");
    newer.view_count = 9_999;
    newer.region_code = "GB".to_string();
    upsert_trending_items(&pool, &[newer]).await.unwrap();

    let row = get_trending_video(&pool, "a").await.unwrap().expect("row");
    assert_eq!(row.batch_id, "b2");
    assert_eq!(row.trending_rank, 1);
    assert_eq!(row.view_count, 9_999);
    assert_eq!(row.region_code, "GB");
    assert_eq!(row.tag_list(), vec!["one", "two"]);
    assert_eq!(count_trending_videos(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn empty_video_ids_are_skipped() {
    let (_dir, pool) = test_pool().await;
    let written = upsert_trending_items(&pool, &[item("", 1, "b1"), item("x", 2, "b1")])
        .await
        .unwrap();
    assert_eq!(written, 1);
    assert_eq!(count_trending_videos(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn largest_signed_counter_round_trips() {
    let (_dir, pool) = test_pool().await;
    let mut big = item("big", 2, "b1");
    big.view_count = i64::MAX.unsigned_abs();

    let written = upsert_trending_items(&pool, &[item("ok", 1, "b1"), big])
        .await
        .unwrap();
    assert_eq!(written, 2);
    let row = get_trending_video(&pool, "big").await.unwrap().unwrap();
    assert_eq!(row.view_count, i64::MAX);
    assert_eq!(count_trending_videos(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn list_since_orders_by_collected_desc_then_rank() {
    let (_dir, pool) = test_pool().await;
    let now = Utc::now();

    let mut old = item("old", 1, "b0");
    old.collected_at = now - Duration::days(30);
    let mut r2 = item("r2", 2, "b1");
    r2.collected_at = now;
    let mut r1 = item("r1", 1, "b1");
    r1.collected_at = now;
    let mut earlier = item("earlier", 1, "b1");
    earlier.collected_at = now - Duration::hours(1);

    upsert_trending_items(&pool, &[old, r2, r1, earlier]).await.unwrap();

    let rows = list_trending_videos_since(&pool, now - Duration::days(7))
        .await
        .unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r.video_id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2", "earlier"]);
}

#[tokio::test]
async fn quota_usage_sums_per_fingerprint_and_day() {
    let (_dir, pool) = test_pool().await;
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let yesterday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

    for (fp, date, used) in [
        ("aaaa", today, 120),
        ("aaaa", today, 30),
        ("aaaa", yesterday, 9_000),
        ("bbbb", today, 5),
    ] {
        insert_quota_usage(
            &pool,
            &NewQuotaUsage {
                credential_fingerprint: fp,
                usage_date: date,
                requests_made: used,
                quota_used: used,
                daily_limit: 10_000,
                region_code: None,
                category_id: None,
                batch_id: Some("b1"),
            },
        )
        .await
        .unwrap();
    }

    assert_eq!(quota_used_on(&pool, "aaaa", today).await.unwrap(), 150);
    assert_eq!(quota_used_on(&pool, "bbbb", today).await.unwrap(), 5);
    assert_eq!(quota_used_on(&pool, "cccc", today).await.unwrap(), 0);

    let rows = list_quota_usage_on(&pool, today).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].credential_fingerprint, "aaaa");
    assert_eq!(rows[0].usage_date, today);
    assert_eq!(rows[0].batch_id.as_deref(), Some("b1"));
}

#[tokio::test]
async fn collection_stats_round_trip_and_window() {
    let (_dir, pool) = test_pool().await;
    let now = Utc::now();

    insert_collection_stats(&pool, &summary("old", now - Duration::days(10)))
        .await
        .unwrap();
    insert_collection_stats(&pool, &summary("new", now)).await.unwrap();

    let rows = list_collection_stats_since(&pool, now - Duration::days(7))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.batch_id, "new");
    assert_eq!(row.total_videos, 7);
    assert_eq!(row.regions_attempted, 2);
    assert_eq!(row.regions_processed, 1);
    assert_eq!(row.errors, 1);
    assert!((row.success_rate - 50.0).abs() < f64::EPSILON);
}
