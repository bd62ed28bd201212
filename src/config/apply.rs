use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveUsize, VolleyArgs};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments that were not given on the
/// command line.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut VolleyArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "mode")
        && let Some(mode) = config.mode
    {
        args.mode = mode;
    }

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = concurrency;
    }

    if !is_cli(matches, "rounds")
        && let Some(rounds) = config.rounds
    {
        args.rounds = PositiveUsize::try_from(rounds).map_err(|err| {
            AppError::config(ConfigError::FieldMustBePositive {
                field: "rounds".to_owned(),
                source: err,
            })
        })?;
    }

    if !is_cli(matches, "delay")
        && let Some(delay) = config.delay.as_ref()
    {
        args.delay = delay.to_delay().map_err(|err| {
            AppError::config(ConfigError::InvalidDuration {
                field: "delay",
                source: err,
            })
        })?;
    }

    if !is_cli(matches, "timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.timeout = timeout.to_timeout().map_err(|err| {
            AppError::config(ConfigError::InvalidDuration {
                field: "timeout",
                source: err,
            })
        })?;
    }

    if !is_cli(matches, "cache_bust")
        && let Some(cache_bust) = config.cache_bust
    {
        args.cache_bust = cache_bust;
    }

    if !is_cli(matches, "output_dir")
        && let Some(dir) = config.output_dir.clone()
    {
        args.output_dir = dir;
    }

    if !is_cli(matches, "export_json")
        && let Some(path) = config.export_json.clone()
    {
        args.export_json = Some(path);
    }

    if !is_cli(matches, "quiet")
        && let Some(quiet) = config.quiet
    {
        args.quiet = quiet;
    }

    if !is_cli(matches, "authorized")
        && let Some(authorized) = config.authorized
    {
        args.authorized = authorized;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}
