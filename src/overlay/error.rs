//! Errors raised while applying override tokens.

use thiserror::Error;

use crate::config::ConfigError;

/// Reasons an override token could not be applied.
///
/// Messages name the offending key or token but never the override value,
/// which may be a secret.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OverlayError {
    #[error("unrecognized override '{0}': expected key=value, a config file, or a resource")]
    UnrecognizedOverride(String),

    #[error("cannot override '{key}': it holds a list of objects, which a flat value cannot replace")]
    ObjectListOverrideRejected { key: String },

    #[error("cannot override '{key}': it holds a list mixing objects, scalars or nested lists")]
    UnsupportedListOverride { key: String },

    #[error("failed to load override '{resource}': {source}")]
    ResourceLoad {
        resource: String,
        source: ConfigError,
    },

    #[error("cannot load '{resource}': unsupported URL scheme '{scheme}'")]
    UnsupportedScheme { resource: String, scheme: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
