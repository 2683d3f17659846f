//! Provenance metadata for configuration values.

use std::fmt;

/// Text shown when a value carries no provenance at all.
pub const UNKNOWN_ORIGIN: &str = "unknown origin";

/// Where a configuration value came from.
///
/// All fields are optional. When displayed, the first present of
/// `url`, `filename`, `resource` and `description` is used, in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Origin {
    pub url: Option<String>,
    pub filename: Option<String>,
    pub resource: Option<String>,
    pub description: Option<String>,
    /// 1-based line number within the source, when known.
    pub line: Option<u32>,
    /// Comment lines immediately preceding the value, without the `#` marker.
    pub comments: Vec<String>,
}

impl Origin {
    /// An origin described by free text only.
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn file(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::default()
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn resource(name: impl Into<String>) -> Self {
        Self {
            resource: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.comments = comments;
        self
    }

    /// The human-readable source of this value.
    pub fn describe(&self) -> &str {
        [&self.url, &self.filename, &self.resource, &self.description]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_ORIGIN)
    }

    /// Like [`describe`](Self::describe), followed by `: <line>` when the line is known.
    pub fn summary(&self) -> String {
        match self.line {
            Some(line) => format!("{}: {line}", self.describe()),
            None => self.describe().to_string(),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_priority() {
        let origin = Origin {
            url: Some("file:///etc/app.toml".into()),
            filename: Some("/etc/app.toml".into()),
            description: Some("defaults".into()),
            ..Origin::default()
        };
        assert_eq!(origin.describe(), "file:///etc/app.toml");

        let origin = Origin {
            url: Some(String::new()),
            filename: Some("app.toml".into()),
            ..Origin::default()
        };
        assert_eq!(origin.describe(), "app.toml");

        assert_eq!(Origin::resource("app.conf").describe(), "app.conf");
        assert_eq!(Origin::described("command line").describe(), "command line");
    }

    #[test]
    fn test_unknown_origin() {
        assert_eq!(Origin::default().describe(), UNKNOWN_ORIGIN);
        assert_eq!(Origin::default().summary(), UNKNOWN_ORIGIN);
    }

    #[test]
    fn test_summary_appends_line() {
        let origin = Origin::file("app.toml").with_line(12);
        assert_eq!(origin.summary(), "app.toml: 12");
        assert_eq!(origin.to_string(), "app.toml: 12");
    }
}
