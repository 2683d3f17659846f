use std::time::Duration;

use toml::Value;

use super::{Config, ConfigError};

impl Config {
    /// Reads a duration.
    ///
    /// Integers are milliseconds. Strings use humantime syntax (`10s`,
    /// `1m 30s`, `250ms`); `inf` and `infinite` mean [`Duration::MAX`].
    pub fn get_duration(&self, path: &str) -> Result<Duration, ConfigError> {
        let value = self
            .get(path)?
            .ok_or_else(|| ConfigError::Missing(path.to_string()))?;

        let invalid = |value: String| ConfigError::InvalidDuration {
            path: path.to_string(),
            value,
        };

        match value {
            Value::Integer(millis) => u64::try_from(*millis)
                .map(Duration::from_millis)
                .map_err(|_| invalid(millis.to_string())),
            Value::String(text) => parse_duration(text).ok_or_else(|| invalid(text.clone())),
            other => Err(invalid(other.to_string())),
        }
    }
}

fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("inf") || text.eq_ignore_ascii_case("infinite") {
        return Some(Duration::MAX);
    }
    if let Ok(millis) = text.parse::<u64>() {
        return Some(Duration::from_millis(millis));
    }
    humantime::parse_duration(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Origin;

    fn config() -> Config {
        Config::parse_str(
            r#"
            timeout = 1500
            retry = "1m 30s"
            short = "250ms"
            forever = "Inf"
            override = "2000"
            negative = -5
            bogus = "soon"
            flag = true
            "#,
            Origin::described("test"),
        )
        .unwrap()
    }

    #[test]
    fn test_durations() {
        let config = config();
        assert_eq!(config.get_duration("timeout").unwrap(), Duration::from_millis(1500));
        assert_eq!(config.get_duration("retry").unwrap(), Duration::from_secs(90));
        assert_eq!(config.get_duration("short").unwrap(), Duration::from_millis(250));
        assert_eq!(config.get_duration("forever").unwrap(), Duration::MAX);
        assert_eq!(config.get_duration("override").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_durations() {
        let config = config();
        for path in ["negative", "bogus", "flag"] {
            assert!(
                matches!(
                    config.get_duration(path),
                    Err(ConfigError::InvalidDuration { .. })
                ),
                "expected {path} to be rejected"
            );
        }
        assert!(matches!(
            config.get_duration("missing"),
            Err(ConfigError::Missing(_))
        ));
    }
}
