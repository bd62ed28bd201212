use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to encode CSV row: {source}")]
    EncodeCsv {
        #[source]
        source: csv::Error,
    },
    #[error("Failed to finish CSV buffer: {source}")]
    FinishCsv {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize JSON export: {source}")]
    SerializeJson {
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not find a free results filename in '{dir}'.")]
    NoFreeFilename { dir: PathBuf },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
