use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use crate::error::{AppError, AppResult, SinkError};
use crate::metrics::{RequestOutcome, TestRun, format_millis};

/// Filename prefix of every results file.
pub const RESULTS_PREFIX: &str = "results-";
/// Collision suffixes tried before giving up.
const MAX_SUFFIX: u32 = 1000;

/// One CSV/JSON row: a request outcome tagged with its 1-based round.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecordRow {
    pub round: usize,
    pub idx: usize,
    pub status: Option<u16>,
    pub bytes: u64,
    pub ms: String,
    pub error: String,
}

impl RecordRow {
    #[must_use]
    pub fn new(round: usize, outcome: &RequestOutcome) -> Self {
        Self {
            round,
            idx: outcome.index(),
            status: outcome.status(),
            bytes: outcome.bytes(),
            ms: format_millis(outcome.elapsed(), 3),
            error: outcome.error().to_owned(),
        }
    }

    pub(crate) fn all(run: &TestRun) -> Vec<Self> {
        run.rows()
            .map(|(round, outcome)| Self::new(round, outcome))
            .collect()
    }
}

/// `results-%Y%m%d_%H%M%S.csv` for the given instant.
#[must_use]
pub fn results_filename(at: DateTime<Utc>) -> String {
    format!("{}{}.csv", RESULTS_PREFIX, at.format("%Y%m%d_%H%M%S"))
}

/// Encode the run as CSV: a header row, then one row per request ordered by
/// round, then index.
///
/// # Errors
///
/// Returns an error if a row cannot be encoded.
pub fn render_csv(run: &TestRun) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in RecordRow::all(run) {
        writer
            .serialize(&row)
            .map_err(|err| AppError::sink(SinkError::EncodeCsv { source: err }))?;
    }
    if run.rounds.iter().all(|round| round.is_empty()) {
        writer
            .write_record(["round", "idx", "status", "bytes", "ms", "error"])
            .map_err(|err| AppError::sink(SinkError::EncodeCsv { source: err }))?;
    }
    writer.into_inner().map_err(|err| {
        AppError::sink(SinkError::FinishCsv {
            source: err.into_error(),
        })
    })
}

/// Write the run into a new results file under `dir` and return its path.
/// An existing file is never overwritten; a `-N` suffix is added instead.
///
/// # Errors
///
/// Returns an error when the directory or file cannot be created or written.
pub async fn write_results(run: &TestRun, dir: &Path) -> AppResult<PathBuf> {
    write_results_at(run, dir, Utc::now()).await
}

pub(crate) async fn write_results_at(
    run: &TestRun,
    dir: &Path,
    at: DateTime<Utc>,
) -> AppResult<PathBuf> {
    let payload = render_csv(run)?;
    tokio::fs::create_dir_all(dir).await.map_err(|err| {
        AppError::sink(SinkError::CreateDir {
            path: dir.to_path_buf(),
            source: err,
        })
    })?;

    let (path, mut file) = create_unique(dir, at).await?;
    let written = async {
        file.write_all(&payload).await?;
        file.flush().await
    }
    .await;
    if let Err(err) = written {
        error!("Failed to write results to {}: {}", path.display(), err);
        return Err(AppError::sink(SinkError::WriteFile { path, source: err }));
    }

    debug!(path = %path.display(), bytes = payload.len(), "results written");
    Ok(path)
}

async fn create_unique(dir: &Path, at: DateTime<Utc>) -> AppResult<(PathBuf, tokio::fs::File)> {
    let base = results_filename(at);
    let stem = base.trim_end_matches(".csv");
    for suffix in 0..=MAX_SUFFIX {
        let name = if suffix == 0 {
            base.clone()
        } else {
            format!("{}-{}.csv", stem, suffix)
        };
        let path = dir.join(name);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(AppError::sink(SinkError::WriteFile { path, source: err }));
            }
        }
    }
    Err(AppError::sink(SinkError::NoFreeFilename {
        dir: dir.to_path_buf(),
    }))
}
