use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::file::load_config_file;
use super::{Config, Origin};
use crate::overlay::{
    fail_on_unrecognized, Overlay, OverlayError, ResourceLoader, Resources, UnrecognizedPolicy,
};
use crate::Error;

/// A configuration layer in the loading pipeline.
#[derive(Debug)]
enum ConfigSource {
    File { path: PathBuf, required: bool },
    Text { text: String, description: String },
}

/// Builder for loading configuration from TOML layers plus override tokens.
///
/// Layers are merged in registration order, with later layers overriding
/// earlier ones. Nested tables are merged recursively; other values
/// (including arrays) are replaced entirely.
///
/// Override tokens registered with [`with_args`](Self::with_args) are applied
/// on top of all layers, and among themselves the first token wins. See
/// [`Overlay`] for the accepted token shapes.
///
/// ## Variable References
///
/// String values can reference other config values using `${path.to.field}` syntax:
///
/// ```toml
/// [server]
/// host = "localhost"
/// port = 8080
/// url = "http://${server.host}:${server.port}/api"
/// ```
///
/// References are resolved once, after overrides are applied, so
/// `server.host=example.com` also changes `server.url`.
/// Use `$$` to escape a literal `$` (e.g., `$${VAR}` becomes `${VAR}`).
///
/// ## Example
///
/// ```no_run
/// use config_overlay::Config;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct MyConfig {
///     name: String,
///     port: u16,
/// }
///
/// let config: MyConfig = Config::builder()
///     .with_file("config/default.toml", true)
///     .with_file("config/local.toml", false)
///     .with_args(std::env::args().skip(1))
///     .build_into()?;
/// # Ok::<(), config_overlay::Error>(())
/// ```
#[must_use = "builders do nothing until .build() is called"]
pub struct ConfigBuilder {
    sources: Vec<ConfigSource>,
    args: Vec<String>,
    resources: Arc<dyn ResourceLoader>,
    unrecognized: Arc<UnrecognizedPolicy>,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            args: Vec::new(),
            resources: Arc::new(Resources::new()),
            unrecognized: Arc::new(fail_on_unrecognized),
        }
    }
}

impl ConfigBuilder {
    /// Adds a TOML file to be loaded.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are silently skipped.
    pub fn with_file(mut self, path: impl AsRef<Path>, required: bool) -> Self {
        self.sources.push(ConfigSource::File {
            path: path.as_ref().to_path_buf(),
            required,
        });
        self
    }

    /// Adds TOML text, attributed to `description` in origins.
    pub fn with_str(mut self, text: impl Into<String>, description: impl Into<String>) -> Self {
        self.sources.push(ConfigSource::Text {
            text: text.into(),
            description: description.into(),
        });
        self
    }

    /// Adds override tokens, applied after every layer.
    ///
    /// May be called more than once; tokens keep their registration order.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the loader used for override tokens that name resources.
    pub fn with_resources(mut self, resources: impl ResourceLoader + 'static) -> Self {
        self.resources = Arc::new(resources);
        self
    }

    /// Sets the policy for override tokens matching no accepted shape.
    pub fn on_unrecognized<F>(mut self, policy: F) -> Self
    where
        F: Fn(&str) -> Result<Config, OverlayError> + Send + Sync + 'static,
    {
        self.unrecognized = Arc::new(policy);
        self
    }

    /// Loads every layer, applies the overrides and resolves references.
    pub fn build(self) -> Result<Config, Error> {
        Ok(self.build_layered()?.1)
    }

    /// Builds the configuration and deserializes it into `T`.
    ///
    /// Override strings are first converted back to the types the layers
    /// use, so `port=9090` fills a numeric `port`.
    pub fn build_into<T: DeserializeOwned>(self) -> Result<T, Error> {
        let (layers, config) = self.build_layered()?;
        Ok(config.coerce_like(&layers).try_deserialize()?)
    }

    /// Returns the merged layers alongside the final configuration.
    fn build_layered(self) -> Result<(Config, Config), Error> {
        let mut merged = Config::empty();

        for source in self.sources {
            let layer = match source {
                ConfigSource::File { path, required } => match load_config_file(&path, required)? {
                    Some(layer) => layer,
                    None => continue,
                },
                ConfigSource::Text { text, description } => {
                    Config::parse_str(&text, Origin::described(description))?
                }
            };
            merged = layer.with_fallback(&merged);
        }
        debug!(
            values = merged.leaf_paths().len(),
            overrides = self.args.len(),
            "loaded config layers"
        );

        let resolved = Overlay::new(&merged)
            .with_shared_resources(self.resources)
            .with_shared_policy(self.unrecognized)
            .apply(&self.args)?;
        Ok((merged, resolved))
    }
}

impl fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("sources", &self.sources)
            .field("args", &self.args.len())
            .field("resources", &self.resources)
            .finish_non_exhaustive()
    }
}
