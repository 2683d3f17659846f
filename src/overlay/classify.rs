//! Classification of raw override tokens.

use std::path::Path;

use tracing::debug;

use super::resource::ResourceLoader;
use super::OverlayError;
use crate::config::{path, Config, PathKind};

/// What a single override token turned out to be.
#[derive(Debug, Clone)]
pub enum Classification {
    /// `key=value`, with any leading dashes removed from the key.
    KeyValuePair { key: String, value: String },
    /// A readable file on disk, already loaded.
    FilePathConfig(Config),
    /// A resource or URL, already loaded.
    UrlPathConfig(Config),
    Unrecognized(String),
}

/// Classifies `token` against `base`.
///
/// Shapes are tried in order: `key=value`, an existing file, then a resource
/// known to `resources`. A `key=value` whose key holds a list of objects in
/// `base` is rejected outright.
pub fn classify(
    base: &Config,
    token: &str,
    resources: &dyn ResourceLoader,
) -> Result<Classification, OverlayError> {
    if let Some((key, value)) = split_key_value(token) {
        if base.kind_of(key) == PathKind::ObjectList {
            return Err(OverlayError::ObjectListOverrideRejected {
                key: key.to_string(),
            });
        }
        debug!(key, "override is a key=value pair");
        return Ok(Classification::KeyValuePair {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    let file = Path::new(token);
    if file.is_file() {
        debug!(path = %file.display(), "override is a config file");
        let config = Config::load_file(file).map_err(|source| OverlayError::ResourceLoad {
            resource: token.to_string(),
            source,
        })?;
        return Ok(Classification::FilePathConfig(config));
    }

    if let Some(config) = resources.load(token)? {
        debug!(resource = token, "override is a resource");
        return Ok(Classification::UrlPathConfig(config));
    }

    Ok(Classification::Unrecognized(token.to_string()))
}

/// Splits `key=value` at the first `=` outside a quoted key segment,
/// accepting only keys that parse as dotted paths. Leading dashes are
/// ignored so `--db.port=5432` works.
fn split_key_value(token: &str) -> Option<(&str, &str)> {
    let (key, value) = path::split_key_value(token.trim_start_matches('-'))?;
    path::split(key).ok()?;
    Some((key, value))
}
