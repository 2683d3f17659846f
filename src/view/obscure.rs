//! Redaction of sensitive values for display.

/// Replacement text for redacted values.
pub const OBSCURED: &str = "**** obscured ****";

/// Path fragments that mark a value as sensitive.
const SENSITIVE_FRAGMENTS: &[&str] = &[
    "password",
    "secret",
    "credential",
    "token",
    "private_key",
    "api_key",
];

/// Decides how a value is displayed, given its path.
///
/// Implemented for any `Fn(&str, &str) -> String`, so closures work:
///
/// ```
/// use config_overlay::{Config, Origin};
///
/// let config = Config::parse_str("pin = \"1234\"", Origin::described("inline"))?;
/// let hide_all = |_path: &str, _value: &str| "?".to_string();
/// assert_eq!(config.summary(&hide_all)[0].value, "?");
/// # Ok::<(), config_overlay::ConfigError>(())
/// ```
pub trait Obscure {
    fn obscure(&self, path: &str, value: &str) -> String;
}

impl<F> Obscure for F
where
    F: Fn(&str, &str) -> String,
{
    fn obscure(&self, path: &str, value: &str) -> String {
        self(path, value)
    }
}

/// The default policy: hides values whose path mentions a credential.
///
/// The check is a case-insensitive substring match against `password`,
/// `secret`, `credential`, `token`, `private_key` and `api_key`.
pub fn obscure_secrets(path: &str, value: &str) -> String {
    let path = path.to_lowercase();
    if SENSITIVE_FRAGMENTS
        .iter()
        .any(|fragment| path.contains(fragment))
    {
        OBSCURED.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_paths_are_obscured() {
        for path in [
            "db.password",
            "DB.PASSWORD",
            "aws.secretAccessKey",
            "service.credentials.user",
            "github.token",
            "tls.private_key",
            "openai.api_key",
        ] {
            assert_eq!(obscure_secrets(path, "hunter2"), OBSCURED, "{path}");
        }
    }

    #[test]
    fn test_other_paths_pass_through() {
        assert_eq!(obscure_secrets("db.host", "localhost"), "localhost");
        assert_eq!(obscure_secrets("show", "all"), "all");
    }

    #[test]
    fn test_closures_are_obscurers() {
        let upper = |_: &str, value: &str| value.to_uppercase();
        assert_eq!(upper.obscure("a", "b"), "B");
    }
}
