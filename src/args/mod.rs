//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;
mod types;


pub use cli::VolleyArgs;
pub use types::{PositiveUsize, RunMode};

pub(crate) use parsers::{parse_delay, parse_duration_arg};
