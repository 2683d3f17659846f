//! Loading override tokens that name resources rather than files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;
use url::Url;

use super::OverlayError;
use crate::config::{Config, ConfigError, Origin};

/// Resolves a token to a configuration when it names a known resource.
pub trait ResourceLoader: Send + Sync + std::fmt::Debug {
    /// Returns `Ok(None)` when `name` is not something this loader handles.
    fn load(&self, name: &str) -> Result<Option<Config>, OverlayError>;
}

/// The default loader: named TOML documents bundled with the program, plus
/// `file://` URLs.
///
/// `http` and `https` URLs are recognised but rejected, since nothing here
/// fetches over the network.
///
/// ```
/// use config_overlay::overlay::{ResourceLoader, Resources};
///
/// let resources = Resources::new().with("prod.toml", "[db]\nhost = \"db.prod\"");
/// let config = resources.load("prod.toml")?.expect("registered resource");
/// assert_eq!(config.get_string("db.host")?, "db.prod");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Resources {
    embedded: BTreeMap<String, String>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a TOML document under `name`.
    pub fn with(mut self, name: impl Into<String>, toml: impl Into<String>) -> Self {
        self.embedded.insert(name.into(), toml.into());
        self
    }
}

impl ResourceLoader for Resources {
    fn load(&self, name: &str) -> Result<Option<Config>, OverlayError> {
        let load_failed = |source: ConfigError| OverlayError::ResourceLoad {
            resource: name.to_string(),
            source,
        };

        if let Some(text) = self.embedded.get(name) {
            debug!(resource = name, "loading embedded resource");
            return Config::parse_str(text, Origin::resource(name))
                .map(Some)
                .map_err(load_failed);
        }

        let Ok(url) = Url::parse(name) else {
            return Ok(None);
        };

        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| load_failed(ConfigError::FileNotFound(PathBuf::from(url.path()))))?;
                debug!(url = %url, "loading file URL");
                let config = Config::load_file(&path).map_err(load_failed)?;
                let location = url.to_string();
                Ok(Some(config.map_origins(|origin| Origin {
                    url: Some(location.clone()),
                    ..origin
                })))
            }
            "http" | "https" => Err(OverlayError::UnsupportedScheme {
                resource: name.to_string(),
                scheme: url.scheme().to_string(),
            }),
            _ => Ok(None),
        }
    }
}
