//! Leaf-by-leaf comparison of two configs.

use std::fmt;

use toml::Value;

use super::Obscure;
use crate::config::Config;

/// One leaf-level difference between two configs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Difference {
    Added { path: String, value: String },
    Removed { path: String, value: String },
    Changed { path: String, from: String, to: String },
}

impl Difference {
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. } | Self::Removed { path, .. } | Self::Changed { path, .. } => path,
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { path, value } => write!(f, "+ {path} : {value}"),
            Self::Removed { path, value } => write!(f, "- {path} : {value}"),
            Self::Changed { path, from, to } => write!(f, "~ {path} : {from} -> {to}"),
        }
    }
}

impl Config {
    /// Compares `self` (before) against `other` (after), leaf by leaf.
    ///
    /// Differences are sorted by path. Values are compared by type and
    /// content, then rendered through `obscure`.
    pub fn diff(&self, other: &Config, obscure: &dyn Obscure) -> Vec<Difference> {
        let mut paths = self.leaf_paths();
        paths.extend(other.leaf_paths());

        paths
            .into_iter()
            .filter_map(|path| {
                let before = self.get(&path).ok().flatten();
                let after = other.get(&path).ok().flatten();
                let show = |value: &Value| obscure.obscure(&path, &display(value));
                match (before, after) {
                    (Some(from), Some(to)) if from == to => None,
                    (Some(from), Some(to)) => Some(Difference::Changed {
                        from: show(from),
                        to: show(to),
                        path: path.clone(),
                    }),
                    (Some(value), None) => Some(Difference::Removed {
                        value: show(value),
                        path: path.clone(),
                    }),
                    (None, Some(value)) => Some(Difference::Added {
                        value: show(value),
                        path: path.clone(),
                    }),
                    (None, None) => None,
                }
            })
            .collect()
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
