//! Persistence of completed runs: the per-request CSV file and the optional
//! JSON export.
mod json;
mod records;


pub use json::{export_json, render_json};
pub use records::{RESULTS_PREFIX, RecordRow, render_csv, results_filename, write_results};

#[cfg(test)]
pub(crate) use records::write_results_at;
