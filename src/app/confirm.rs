use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::error::{AppError, AppResult, ValidationError};

/// Exact phrase the operator must type before any traffic is sent.
pub(crate) const OWNERSHIP_PHRASE: &str = "I_OWN_THIS_SITE";

/// Ask the operator on the terminal unless `authorized` was already given.
///
/// # Errors
///
/// Returns an error when the phrase does not match or the terminal fails.
pub(crate) fn confirm_ownership(authorized: bool) -> AppResult<()> {
    if authorized {
        info!("Ownership confirmed via --authorized.");
        return Ok(());
    }
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    confirm_from(&mut stdin.lock(), &mut stdout)
}

pub(crate) fn confirm_from<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> AppResult<()> {
    writeln!(
        output,
        "WARNING: only use this tool against sites you own or are explicitly authorized to test."
    )?;
    write!(output, "If you own the site, type exactly {}\n> ", OWNERSHIP_PHRASE)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    if answer.trim() == OWNERSHIP_PHRASE {
        return Ok(());
    }

    warn!("Ownership confirmation failed; exiting.");
    writeln!(output, "Confirmation not received. Exiting.")?;
    Err(AppError::validation(ValidationError::OwnershipNotConfirmed))
}
