//! Dotted path parsing and rendering.
//!
//! A path is a `.`-separated list of segments. Bare segments may contain
//! ASCII letters, digits, `_` and `-`; anything else must be quoted with
//! `"..."` (for example `env."ProgramFiles(x86)"`).

use super::ConfigError;

/// Splits a dotted path into its segments.
///
/// Whitespace around unquoted segments is ignored, matching TOML dotted keys.
pub fn split(path: &str) -> Result<Vec<String>, ConfigError> {
    let invalid = || ConfigError::InvalidPath(path.to_string());

    let mut segments = Vec::new();
    let mut chars = path.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let segment = match chars.peek() {
            Some('"') | Some('\'') => {
                let quote = chars.next().ok_or_else(invalid)?;
                let mut quoted = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == quote => break,
                        Some('\\') if quote == '"' => quoted.push(chars.next().ok_or_else(invalid)?),
                        Some(c) => quoted.push(c),
                        None => return Err(invalid()),
                    }
                }
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
                quoted
            }
            _ => {
                let mut bare = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '.' {
                        break;
                    }
                    bare.push(c);
                    chars.next();
                }
                let bare = bare.trim_end().to_string();
                if bare.is_empty() || !is_bare(&bare) {
                    return Err(invalid());
                }
                bare
            }
        };
        segments.push(segment);

        match chars.next() {
            None => return Ok(segments),
            Some('.') => continue,
            Some(_) => return Err(invalid()),
        }
    }
}

/// Joins segments back into a path, quoting segments that are not bare keys.
pub fn join<I>(segments: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| quote_segment(s.as_ref()))
        .collect::<Vec<_>>()
        .join(".")
}

/// Returns the first segment of a path as it would be rendered.
pub fn root(path: &str) -> Option<String> {
    split(path)
        .ok()
        .and_then(|segments| segments.first().map(|s| quote_segment(s)))
}

/// Returns true if `segment` can appear in a path without quotes.
pub fn is_bare(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Splits `key = value` at the first `=` outside a quoted key.
///
/// The key is trimmed; the value is returned as written.
pub(crate) fn split_key_value(text: &str) -> Option<(&str, &str)> {
    let mut quote = None;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '=') => return Some((text[..i].trim(), &text[i + 1..])),
            _ => {}
        }
    }
    None
}

fn quote_segment(segment: &str) -> String {
    if is_bare(segment) {
        segment.to_string()
    } else {
        let escaped = segment.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_bare_segments() {
        assert_eq!(split("a.b-c.d_1").unwrap(), vec!["a", "b-c", "d_1"]);
    }

    #[test]
    fn test_split_quoted_segment() {
        assert_eq!(
            split(r#"env."ProgramFiles(x86)".x"#).unwrap(),
            vec!["env", "ProgramFiles(x86)", "x"]
        );
        assert_eq!(split("'a.b'.c").unwrap(), vec!["a.b", "c"]);
    }

    #[test]
    fn test_split_tolerates_spaces_around_dots() {
        assert_eq!(split("a . b").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_split_rejects_malformed_paths() {
        for bad in ["", "a..b", ".a", "a.", "a/b", "a b", "\"open"] {
            assert!(
                matches!(split(bad), Err(ConfigError::InvalidPath(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_join_quotes_when_needed() {
        assert_eq!(join(&["a", "b.c", ""]), r#"a."b.c"."""#);
        assert_eq!(split(&join(&["a", "b.c"])).unwrap(), vec!["a", "b.c"]);
    }

    #[test]
    fn test_split_key_value_skips_quoted_equals() {
        assert_eq!(split_key_value("a.b = 1=2"), Some(("a.b", " 1=2")));
        assert_eq!(
            split_key_value(r#""a=b".c=1"#),
            Some((r#""a=b".c"#, "1"))
        );
        assert_eq!(split_key_value("'x=y'"), None);
    }

    #[test]
    fn test_root() {
        assert_eq!(root("server.host").as_deref(), Some("server"));
        assert_eq!(root(r#""a.b".c"#).as_deref(), Some(r#""a.b""#));
    }
}
