//! `export` command: dump recently collected rows to JSON, CSV, or Excel.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use rust_xlsxwriter::Workbook;
use serde::Serialize;
use sqlx::SqlitePool;
use ytrend_db::TrendingVideoRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportFormat {
    Json,
    Csv,
    Excel,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }
}

/// One exported row. Column order here is the column order in every format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ExportRecord {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub region_code: String,
    pub category_name: String,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub engagement_rate: f64,
    pub trending_rank: i64,
    pub collected_at: DateTime<Utc>,
    pub batch_id: String,
}

const HEADERS: [&str; 12] = [
    "video_id",
    "title",
    "channel_title",
    "region_code",
    "category_name",
    "view_count",
    "like_count",
    "comment_count",
    "engagement_rate",
    "trending_rank",
    "collected_at",
    "batch_id",
];

impl From<TrendingVideoRow> for ExportRecord {
    fn from(row: TrendingVideoRow) -> Self {
        Self {
            video_id: row.video_id,
            title: row.title,
            channel_title: row.channel_title,
            region_code: row.region_code,
            category_name: row.category_name,
            view_count: row.view_count,
            like_count: row.like_count,
            comment_count: row.comment_count,
            engagement_rate: row.engagement_rate,
            trending_rank: row.trending_rank,
            collected_at: row.collected_at,
            batch_id: row.batch_id,
        }
    }
}

pub(crate) fn default_output_path(format: ExportFormat, now: DateTime<Utc>) -> PathBuf {
    PathBuf::from(format!(
        "trending_export_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

/// Handler for `ytrend export`.
///
/// Rows are those collected in the last `days` days, ordered newest first
/// and by rank within a collection. Nothing is written when there are no rows.
///
/// # Errors
///
/// Returns an error if the query fails or the output file cannot be written.
pub(crate) async fn run_export(
    pool: &SqlitePool,
    format: ExportFormat,
    days: u32,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let now = Utc::now();
    let since = now - Duration::days(i64::from(days));
    let rows = ytrend_db::list_trending_videos_since(pool, since).await?;

    if rows.is_empty() {
        println!("no trending videos collected in the last {days} days; nothing exported");
        return Ok(());
    }

    let records: Vec<ExportRecord> = rows.into_iter().map(ExportRecord::from).collect();
    let path = output.unwrap_or_else(|| default_output_path(format, now));

    write_records(format, &records, &path)?;
    tracing::info!(path = %path.display(), rows = records.len(), ?format, "export written");
    println!("exported {} records to {}", records.len(), path.display());
    Ok(())
}

/// Write `records` to `path` in `format`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub(crate) fn write_records(
    format: ExportFormat,
    records: &[ExportRecord],
    path: &Path,
) -> anyhow::Result<()> {
    match format {
        ExportFormat::Json => write_json(records, path),
        ExportFormat::Csv => write_csv(records, path),
        ExportFormat::Excel => write_excel(records, path),
    }
}

fn write_json(records: &[ExportRecord], path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn write_csv(records: &[ExportRecord], path: &Path) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn write_excel(records: &[ExportRecord], path: &Path) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("trending")?;

    for (col, header) in (0_u16..).zip(HEADERS) {
        sheet.write_string(0, col, header)?;
    }

    for (row, r) in (1_u32..).zip(records) {
        sheet.write_string(row, 0, &r.video_id)?;
        sheet.write_string(row, 1, &r.title)?;
        sheet.write_string(row, 2, &r.channel_title)?;
        sheet.write_string(row, 3, &r.region_code)?;
        sheet.write_string(row, 4, &r.category_name)?;
        sheet.write_number(row, 5, r.view_count as f64)?;
        sheet.write_number(row, 6, r.like_count as f64)?;
        sheet.write_number(row, 7, r.comment_count as f64)?;
        sheet.write_number(row, 8, r.engagement_rate)?;
        sheet.write_number(row, 9, r.trending_rank as f64)?;
        sheet.write_string(row, 10, r.collected_at.to_rfc3339())?;
        sheet.write_string(row, 11, &r.batch_id)?;
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(video_id: &str, rank: i64) -> ExportRecord {
        ExportRecord {
            video_id: video_id.to_string(),
            title: "A, \"quoted\" title".to_string(),
            channel_title: "Chan".to_string(),
            region_code: "US".to_string(),
            category_name: "Music".to_string(),
            view_count: 1000,
            like_count: 40,
            comment_count: 10,
            engagement_rate: 5.0,
            trending_rank: rank,
            collected_at: Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap(),
            batch_id: "20261019_120000".to_string(),
        }
    }

    #[test]
    fn default_path_uses_timestamp_and_extension() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 3).unwrap();
        assert_eq!(
            default_output_path(ExportFormat::Excel, now),
            PathBuf::from("trending_export_20261019_080503.xlsx")
        );
        assert_eq!(
            default_output_path(ExportFormat::Csv, now),
            PathBuf::from("trending_export_20261019_080503.csv")
        );
    }

    #[test]
    fn json_export_is_an_array_of_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_records(ExportFormat::Json, &[record("a", 1), record("b", 2)], &path).unwrap();

        let body: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["video_id"], "b");
        assert_eq!(rows[1]["trending_rank"], 2);
    }

    #[test]
    fn csv_export_has_header_and_escapes_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_records(ExportFormat::Csv, &[record("a", 1)], &path).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = rdr.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers, HEADERS);
        let rows: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "A, \"quoted\" title");
    }

    #[test]
    fn excel_export_writes_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_records(ExportFormat::Excel, &[record("a", 1)], &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"), "xlsx is a zip container");
    }
}
