use url::Url;

use crate::error::{AppError, AppResult, ValidationError};

/// Check that `raw` is an absolute URL with a host, returning it trimmed.
///
/// # Errors
///
/// Returns a validation error describing what is missing.
pub(crate) fn validate_target(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(ValidationError::MissingUrl));
    }
    let parsed = match Url::parse(trimmed) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(AppError::validation(ValidationError::UrlMissingScheme {
                url: trimmed.to_owned(),
            }));
        }
        Err(url::ParseError::EmptyHost) => {
            return Err(AppError::validation(ValidationError::UrlMissingHost {
                url: trimmed.to_owned(),
            }));
        }
        Err(source) => {
            return Err(AppError::validation(ValidationError::InvalidUrl {
                url: trimmed.to_owned(),
                source,
            }));
        }
    };
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::validation(ValidationError::UrlMissingHost {
            url: trimmed.to_owned(),
        }));
    }
    Ok(trimmed.to_owned())
}
