use crate::config::ConfigError;
use crate::overlay::OverlayError;
use thiserror::Error;

/// Top-level error type for the config-overlay library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("override error: {0}")]
    Overlay(#[from] OverlayError),
}
