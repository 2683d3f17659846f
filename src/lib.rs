//! Layered configuration with command-line style overrides.
//!
//! A base [`Config`] is combined with override tokens (`key=value` pairs,
//! config files, bundled resources) into a new config where the first token
//! wins. Views over the result list its paths, trace where each value came
//! from, and print summaries with secrets obscured.

pub mod config;
mod error;
pub mod overlay;
pub mod view;

pub use config::{Config, ConfigBuilder, ConfigError, Origin};
pub use error::Error;
pub use overlay::{Overlay, OverlayError};
pub use view::{obscure_secrets, Obscure, StringEntry};
