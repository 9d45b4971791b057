//! Immutable per-run JSON snapshots.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use ytrend_core::TrendingItem;

use crate::error::SnapshotError;
use crate::orchestrator::CollectionRun;

const COLLECTOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
struct SnapshotMetadata<'a> {
    batch_id: &'a str,
    collection_date: DateTime<Utc>,
    total_videos: usize,
    collector_version: &'static str,
}

#[derive(Debug, Serialize)]
struct Snapshot<'a> {
    collection_metadata: SnapshotMetadata<'a>,
    videos: &'a [TrendingItem],
}

/// `<data_dir>/<YYYY-MM-DD>_<batch_id>.json`
#[must_use]
pub fn snapshot_path(data_dir: &Path, collected_at: DateTime<Utc>, batch_id: &str) -> PathBuf {
    data_dir.join(format!("{}_{batch_id}.json", collected_at.format("%Y-%m-%d")))
}

/// Writes the run's snapshot, creating `data_dir` if needed.
///
/// The file is created with create-new semantics: an existing snapshot for the
/// same batch is never overwritten. Zero-item runs still produce a file.
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if the directory or file cannot be created
/// (including when the file already exists), or [`SnapshotError::Serialize`]
/// if encoding fails.
pub async fn write_snapshot(
    data_dir: &Path,
    run: &CollectionRun,
) -> Result<PathBuf, SnapshotError> {
    let path = snapshot_path(data_dir, run.summary.collected_at, &run.summary.batch_id);
    let io_err = |source: std::io::Error| SnapshotError::Io {
        path: path.clone(),
        source,
    };

    let snapshot = Snapshot {
        collection_metadata: SnapshotMetadata {
            batch_id: &run.summary.batch_id,
            collection_date: run.summary.collected_at,
            total_videos: run.items.len(),
            collector_version: COLLECTOR_VERSION,
        },
        videos: &run.items,
    };
    let body = serde_json::to_vec_pretty(&snapshot)?;

    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|source| SnapshotError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(io_err)?;
    file.write_all(&body).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)?;

    Ok(path)
}
