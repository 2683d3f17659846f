use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("required config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config from {origin}: {source}")]
    ParseError {
        origin: String,
        source: toml::de::Error,
    },

    #[error("no configuration value at path: {0}")]
    Missing(String),

    #[error("value at '{path}' is {found}, expected {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid config path: {0:?}")]
    InvalidPath(String),

    #[error("invalid duration at '{path}': {value}")]
    InvalidDuration { path: String, value: String },

    #[error("failed to render config: {0}")]
    RenderError(#[from] toml::ser::Error),

    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] toml::de::Error),

    #[error("circular reference: {0}")]
    CircularReference(String),

    #[error("referenced path not found: {0}")]
    ReferenceNotFound(String),

    #[error("invalid reference path: {0}")]
    InvalidReferencePath(String),

    #[error("cannot reference non-scalar value: {0}")]
    NonScalarReference(String),

    #[error("unclosed reference (missing '}}')")]
    UnclosedReference,
}
