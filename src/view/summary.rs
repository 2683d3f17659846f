//! Human-readable listings of a config's values.

use std::fmt;

use super::Obscure;
use crate::config::{Config, Origin, UNKNOWN_ORIGIN};

/// The pseudo-key that asks for a summary instead of a normal run.
pub const SHOW_KEY: &str = "show";

/// One displayed configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringEntry {
    pub comments: Vec<String>,
    pub origin: String,
    pub path: String,
    pub value: String,
}

impl fmt::Display for StringEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for comment in &self.comments {
            writeln!(f, "# {comment}")?;
        }
        write!(f, "{} : {} # {}", self.path, self.value, self.origin)
    }
}

impl Config {
    /// Lists every scalar value, sorted by path.
    ///
    /// Lists are left out. Each value is passed through `obscure` before it
    /// is recorded.
    pub fn summary(&self, obscure: &dyn Obscure) -> Vec<StringEntry> {
        self.leaf_paths()
            .into_iter()
            .filter_map(|path| {
                let value = self.get_string(&path).ok()?;
                let origin = self.origin_of(&path);
                Some(StringEntry {
                    comments: origin.map(|o| o.comments.clone()).unwrap_or_default(),
                    origin: origin
                        .map(Origin::summary)
                        .unwrap_or_else(|| UNKNOWN_ORIGIN.to_string()),
                    value: obscure.obscure(&path, &value),
                    path,
                })
            })
            .collect()
    }

    /// Renders a summary when the config sets `show`.
    ///
    /// `show=all`, `show=root` or an empty `show=` list everything; any other
    /// value lists the paths containing it, ignoring case. The `show` key
    /// itself is never listed. Returns `None` when `show` is not set.
    pub fn show_if_specified(&self, obscure: &dyn Obscure) -> Option<String> {
        let selector = self.get_string(SHOW_KEY).ok()?;
        let view = self.exclude_path(SHOW_KEY);
        let view = match selector.as_str() {
            "all" | "" | "root" => view,
            filter => {
                let needle = filter.to_lowercase();
                view.filter(|path| path.to_lowercase().contains(&needle))
            }
        };

        let lines: Vec<String> = view
            .summary(obscure)
            .iter()
            .map(ToString::to_string)
            .collect();
        Some(lines.join("\n"))
    }
}
