//! Typing a `key=value` override against the base configuration.

use toml::Value;
use tracing::trace;

use super::OverlayError;
use crate::config::{Config, Origin, PathKind};

/// Builds the single-path config a `key=value` override contributes.
///
/// The override string carries no type, so the shape of the existing value
/// at `key` decides it:
///
/// - a list of scalars (or an empty list): `value` is split on `,`, keeping
///   empty fields, so `a,b,` becomes `["a", "b", ""]`
/// - a list of objects or a mixed list: rejected
/// - anything else, including no value at all: `value` as a string
pub fn build_fragment(
    base: &Config,
    key: &str,
    value: &str,
    origin: Origin,
) -> Result<Config, OverlayError> {
    let kind = base.kind_of(key);
    let typed = match kind {
        PathKind::ScalarList => Value::Array(
            value
                .split(',')
                .map(|item| Value::String(item.to_string()))
                .collect(),
        ),
        PathKind::ObjectList => {
            return Err(OverlayError::ObjectListOverrideRejected {
                key: key.to_string(),
            })
        }
        PathKind::MixedList => {
            return Err(OverlayError::UnsupportedListOverride {
                key: key.to_string(),
            })
        }
        PathKind::Scalar | PathKind::Object | PathKind::Absent => Value::String(value.to_string()),
    };
    trace!(key, ?kind, "built override fragment");

    Ok(Config::from_path_value(key, typed, origin)?)
}
