//! Applying user-supplied override tokens to a base configuration.
//!
//! Each token is classified ([`classify`]), typed against the base config
//! when it is a `key=value` pair ([`build_fragment`]), and the resulting
//! fragments are merged over the base with the first token winning
//! ([`merge`]).
//!
//! ```
//! use config_overlay::config::{Config, Origin};
//!
//! let base = Config::parse_str("a = 1\nb = [1, 2]", Origin::described("defaults"))?;
//! let merged = base.with_user_args(["a=9", "b=3,4,5"])?;
//!
//! assert_eq!(merged.get_string("a")?, "9");
//! assert_eq!(merged.get_string_list("b")?, ["3", "4", "5"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod classify;
mod error;
mod fragment;
mod merge;
mod policy;
mod resource;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

pub use classify::{classify, Classification};
pub use error::OverlayError;
pub use fragment::build_fragment;
pub use merge::merge;
pub use policy::{fail_on_unrecognized, ignore_unrecognized, UnrecognizedPolicy};
pub use resource::{ResourceLoader, Resources};

use crate::config::{Config, Origin};

/// Applies override tokens to a borrowed base config.
///
/// The same `Overlay` can be applied to any number of token lists; the base
/// is never modified.
#[must_use = "an overlay does nothing until .apply() is called"]
pub struct Overlay<'a> {
    base: &'a Config,
    resources: Arc<dyn ResourceLoader>,
    unrecognized: Arc<UnrecognizedPolicy>,
    resolve: bool,
}

impl<'a> Overlay<'a> {
    /// An overlay with an empty [`Resources`] loader, the fail-fast
    /// unrecognized policy, and reference resolution enabled.
    pub fn new(base: &'a Config) -> Self {
        Self {
            base,
            resources: Arc::new(Resources::new()),
            unrecognized: Arc::new(fail_on_unrecognized),
            resolve: true,
        }
    }

    pub fn with_resources(mut self, resources: impl ResourceLoader + 'static) -> Self {
        self.resources = Arc::new(resources);
        self
    }

    pub(crate) fn with_shared_resources(mut self, resources: Arc<dyn ResourceLoader>) -> Self {
        self.resources = resources;
        self
    }

    /// Sets the policy for tokens matching none of the accepted shapes.
    pub fn on_unrecognized<F>(mut self, policy: F) -> Self
    where
        F: Fn(&str) -> Result<Config, OverlayError> + Send + Sync + 'static,
    {
        self.unrecognized = Arc::new(policy);
        self
    }

    pub(crate) fn with_shared_policy(mut self, policy: Arc<UnrecognizedPolicy>) -> Self {
        self.unrecognized = policy;
        self
    }

    /// Whether `${...}` references are resolved after merging. On by default.
    pub fn resolve_references(mut self, resolve: bool) -> Self {
        self.resolve = resolve;
        self
    }

    /// Classifies every token, then merges them over the base.
    ///
    /// The first failing token aborts the whole overlay; no override is
    /// applied unless all of them are. Values given as `key=value` are kept
    /// as written: a `$` in them never starts a reference.
    pub fn apply<I, S>(&self, tokens: I) -> Result<Config, OverlayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fragments = Vec::new();
        for (index, token) in tokens.into_iter().enumerate() {
            let token = token.as_ref();
            let fragment = match classify(self.base, token, self.resources.as_ref())? {
                Classification::KeyValuePair { key, value } => {
                    let fragment = build_fragment(
                        self.base,
                        &key,
                        &value,
                        Origin::described(format!("command-line argument #{}", index + 1)),
                    )?;
                    if self.resolve {
                        fragment.escape_references()
                    } else {
                        fragment
                    }
                }
                Classification::FilePathConfig(config) | Classification::UrlPathConfig(config) => {
                    config
                }
                Classification::Unrecognized(token) => (self.unrecognized)(token.as_str())?,
            };
            fragments.push(fragment);
        }
        debug!(tokens = fragments.len(), "classified overrides");

        let merged = merge(self.base, &fragments);
        if self.resolve {
            Ok(merged.resolve()?)
        } else {
            Ok(merged)
        }
    }
}

impl fmt::Debug for Overlay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("base", self.base)
            .field("resources", &self.resources)
            .field("resolve", &self.resolve)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Applies override tokens with the default [`Overlay`] settings.
    pub fn with_user_args<I, S>(&self, tokens: I) -> Result<Config, OverlayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Overlay::new(self).apply(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn base() -> Config {
        Config::parse_str(
            r#"
            a = 1
            b = [1, 2]
            url = "http://${host}:8080"
            host = "localhost"
            servers = [{ host = "a" }, { host = "b" }]

            [db]
            password = "hunter2"
            "#,
            Origin::described("defaults"),
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end() {
        let merged = base().with_user_args(["a=9", "b=3,4,5"]).unwrap();
        assert_eq!(merged.get_string("a").unwrap(), "9");
        assert_eq!(merged.get_string_list("b").unwrap(), vec!["3", "4", "5"]);
        assert_eq!(
            merged.origin_of("a").unwrap().describe(),
            "command-line argument #1"
        );
        assert_eq!(merged.origin_of("host").unwrap().describe(), "defaults");
    }

    #[test]
    fn test_first_token_wins() {
        let merged = base().with_user_args(["a=first", "a=second"]).unwrap();
        assert_eq!(merged.get_string("a").unwrap(), "first");
    }

    #[test]
    fn test_no_tokens_is_identity() {
        let base = base().resolve().unwrap();
        let merged = base.with_user_args(Vec::<String>::new()).unwrap();
        assert_eq!(merged.root(), base.root());
    }

    #[test]
    fn test_references_resolved_after_merge() {
        let merged = base().with_user_args(["host=db.internal"]).unwrap();
        assert_eq!(merged.get_string("url").unwrap(), "http://db.internal:8080");

        let unresolved = Overlay::new(&base())
            .resolve_references(false)
            .apply(["host=db.internal"])
            .unwrap();
        assert_eq!(unresolved.get_string("url").unwrap(), "http://${host}:8080");
    }

    #[test]
    fn test_key_value_overrides_are_literal() {
        let merged = base()
            .with_user_args(["db.password=pa$$word", "b=${x},$"])
            .unwrap();
        assert_eq!(merged.get_string("db.password").unwrap(), "pa$$word");
        assert_eq!(merged.get_string_list("b").unwrap(), vec!["${x}", "$"]);

        let merged = base().with_user_args(["db.password=ab${cd"]).unwrap();
        assert_eq!(merged.get_string("db.password").unwrap(), "ab${cd");

        let merged = base().with_user_args(["host=$${h}"]).unwrap();
        assert_eq!(merged.get_string("url").unwrap(), "http://$${h}:8080");

        let unresolved = Overlay::new(&base())
            .resolve_references(false)
            .apply(["db.password=pa$$word"])
            .unwrap();
        assert_eq!(unresolved.get_string("db.password").unwrap(), "pa$$word");
    }

    #[test]
    fn test_file_and_key_value_precedence() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a = \"from-file\"\nnew = \"file-only\"").unwrap();
        let path = file.path().display().to_string();

        let merged = base().with_user_args(["a=cli", path.as_str()]).unwrap();
        assert_eq!(merged.get_string("a").unwrap(), "cli");
        assert_eq!(merged.get_string("new").unwrap(), "file-only");

        let merged = base().with_user_args([path.as_str(), "a=cli"]).unwrap();
        assert_eq!(merged.get_string("a").unwrap(), "from-file");
    }

    #[test]
    fn test_resources() {
        let base = base();
        let merged = Overlay::new(&base)
            .with_resources(Resources::new().with("prod", "a = \"prod\""))
            .apply(["prod"])
            .unwrap();
        assert_eq!(merged.get_string("a").unwrap(), "prod");
        assert_eq!(merged.origin_of("a").unwrap().describe(), "prod");
    }

    #[test]
    fn test_unrecognized_fails_by_default() {
        let result = base().with_user_args(["a=9", "not-a-thing"]);
        assert!(matches!(
            result,
            Err(OverlayError::UnrecognizedOverride(token)) if token == "not-a-thing"
        ));
    }

    #[test]
    fn test_unrecognized_policy_is_pluggable() {
        let base = base();
        let merged = Overlay::new(&base)
            .on_unrecognized(ignore_unrecognized)
            .apply(["a=9", "not-a-thing"])
            .unwrap();
        assert_eq!(merged.get_string("a").unwrap(), "9");

        let merged = Overlay::new(&base)
            .on_unrecognized(|token| {
                Config::from_path_value("flags", token.into(), Origin::described("flag"))
                    .map_err(OverlayError::from)
            })
            .apply(["verbose"])
            .unwrap();
        assert_eq!(merged.get_string("flags").unwrap(), "verbose");
    }

    #[test]
    fn test_object_list_override_aborts_everything() {
        let result = base().with_user_args(["a=9", "servers=x"]);
        assert!(matches!(
            result,
            Err(OverlayError::ObjectListOverrideRejected { .. })
        ));
    }

    #[test]
    fn test_error_message_hides_value() {
        let err = base()
            .with_user_args(["servers=s3cr3t-value"])
            .unwrap_err();
        assert!(!err.to_string().contains("s3cr3t-value"));
    }
}
