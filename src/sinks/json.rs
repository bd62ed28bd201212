use std::path::Path;

use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{AppError, AppResult, SinkError};
use crate::metrics::{Summary, TestRun};

use super::records::RecordRow;

/// Build the `{ "summary": {...}, "records": [...] }` document.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn render_json(run: &TestRun, summary: &Summary) -> AppResult<Vec<u8>> {
    let status_counts: Vec<serde_json::Value> = summary
        .status_counts
        .iter()
        .map(|(status, count)| {
            serde_json::json!({
                "status": status,
                "count": count
            })
        })
        .collect();
    let percentiles = summary.percentiles.map(|p| {
        serde_json::json!({
            "p50_us": p.p50.as_micros(),
            "p90_us": p.p90.as_micros(),
            "p99_us": p.p99.as_micros()
        })
    });

    let summary_json = serde_json::json!({
        "url": run.url,
        "rounds": run.rounds.len(),
        "duration_ms": run.duration.as_millis(),
        "total_requests": summary.total_requests,
        "success_count": summary.success_count,
        "success_rate_x100": summary.success_rate_x100(),
        "requests_per_second_x100": summary.requests_per_second_x100(run.duration),
        "status_counts": status_counts,
        "total_bytes": summary.total_bytes,
        "avg_latency_us": summary.avg_latency.as_micros(),
        "min_latency_us": summary.min_latency.as_micros(),
        "max_latency_us": summary.max_latency.as_micros(),
        "percentiles": percentiles
    });

    let payload = serde_json::json!({
        "summary": summary_json,
        "records": RecordRow::all(run)
    });

    serde_json::to_vec_pretty(&payload)
        .map_err(|err| AppError::sink(SinkError::SerializeJson { source: err }))
}

/// Write the JSON export to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem step fails.
pub async fn export_json(path: &Path, run: &TestRun, summary: &Summary) -> AppResult<()> {
    let json = render_json(run, summary)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(|err| {
            AppError::sink(SinkError::CreateDir {
                path: parent.to_path_buf(),
                source: err,
            })
        })?;
    }

    let write_err = |err: std::io::Error| {
        AppError::sink(SinkError::WriteFile {
            path: path.to_path_buf(),
            source: err,
        })
    };
    let file = tokio::fs::File::create(path).await.map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&json).await.map_err(write_err)?;
    writer.flush().await.map_err(write_err)?;
    Ok(())
}
