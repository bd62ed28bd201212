use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::{debug, error};

use crate::app::{self, RunOutputs};
use crate::args::VolleyArgs;
use crate::config::{DEFAULT_CONFIG_FILES, apply_config, load_config};
use crate::error::{AppError, AppResult, ValidationError};

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    crate::logger::init_logging(args.verbose);

    if let Some(config) = load_config(args.config.as_deref())? {
        debug!("Applying config file values");
        apply_config(&mut args, &matches, &config)?;
    }

    let Some(raw_url) = args.url.as_deref() else {
        error!("Missing URL (set --url or provide in config).");
        return Err(AppError::validation(ValidationError::MissingUrl));
    };
    let url = app::validate_target(raw_url).inspect_err(|err| error!("{}", err))?;
    println!("Target: {}", url);

    app::confirm_ownership(args.authorized)?;

    debug!(mode = args.mode.as_str(), "Building run plan");
    let plan = app::plan_from_args(&args, url);
    let outputs = RunOutputs::from_args(&args);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(app::run_volley(plan, outputs))
}

fn parse_args() -> AppResult<Option<(VolleyArgs, ArgMatches)>> {
    let mut cmd = VolleyArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = VolleyArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}
