//! What to do with tokens that are neither `key=value`, a file, nor a resource.

use tracing::warn;

use super::OverlayError;
use crate::config::Config;

/// Turns an unrecognized token into a config fragment, or fails.
pub type UnrecognizedPolicy = dyn Fn(&str) -> Result<Config, OverlayError> + Send + Sync;

/// The default: reject the token, aborting the whole overlay.
pub fn fail_on_unrecognized(token: &str) -> Result<Config, OverlayError> {
    Err(OverlayError::UnrecognizedOverride(token.to_string()))
}

/// Logs a warning and contributes nothing.
pub fn ignore_unrecognized(token: &str) -> Result<Config, OverlayError> {
    warn!(token, "ignoring unrecognized override");
    Ok(Config::empty())
}
