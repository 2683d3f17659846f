//! File-based configuration loading with line and comment provenance.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, trace};

use super::origin::Origin;
use super::tree::leaf_paths_of;
use super::{path, Config, ConfigError};

impl Config {
    /// Loads a TOML file.
    ///
    /// Every value records the file name, the line its key appears on and
    /// the comment lines directly above it.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match load_config_file(path, true)? {
            Some(config) => Ok(config),
            None => Err(ConfigError::FileNotFound(path.to_path_buf())),
        }
    }
}

/// Loads and parses a TOML config file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
pub(crate) fn load_config_file(path: &Path, required: bool) -> Result<Option<Config>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            debug!(path = %path.display(), "loading config file");
            let filename = path.display().to_string();
            let table: toml::Table =
                toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                    origin: filename.clone(),
                    source: e,
                })?;

            let annotations = annotate(&contents);
            let origins: BTreeMap<String, Origin> = leaf_paths_of(&table)
                .into_iter()
                .map(|leaf| {
                    let origin = Origin::file(&filename);
                    let origin = match nearest_annotation(&annotations, &leaf) {
                        Some(note) => origin
                            .with_line(note.line)
                            .with_comments(note.comments.clone()),
                        None => origin,
                    };
                    (leaf, origin)
                })
                .collect();
            trace!(values = origins.len(), "parsed config file");

            Ok(Some(Config::from_parts(table, origins)))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(ConfigError::FileNotFound(path.to_path_buf()))
            } else {
                debug!(path = %path.display(), "optional config file not found, skipping");
                Ok(None)
            }
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Where a key was written in the source text.
#[derive(Debug, Clone, PartialEq)]
struct Annotation {
    line: u32,
    comments: Vec<String>,
}

/// Finds the annotation for `leaf`, or for its closest annotated ancestor.
///
/// Keys inside inline tables and arrays of tables are attributed to the key
/// that opened them.
fn nearest_annotation<'a>(
    annotations: &'a BTreeMap<String, Annotation>,
    leaf: &str,
) -> Option<&'a Annotation> {
    let segments = path::split(leaf).ok()?;
    (1..=segments.len())
        .rev()
        .find_map(|len| annotations.get(&path::join(&segments[..len])))
}

/// Scans TOML text for key definitions.
///
/// The text has already been parsed successfully, so this only needs to track
/// table headers, comments and values that span several lines.
fn annotate(text: &str) -> BTreeMap<String, Annotation> {
    let mut annotations = BTreeMap::new();
    let mut scanner = Scanner::default();
    // `None` while inside an array of tables, whose keys are not leaves.
    let mut table: Option<Vec<String>> = Some(Vec::new());
    let mut comments = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let number = index as u32 + 1;

        if scanner.in_value() {
            scanner.scan(line);
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            comments.clear();
        } else if let Some(comment) = trimmed.strip_prefix('#') {
            comments.push(comment.trim().to_string());
        } else if let Some(header) = trimmed.strip_prefix("[[") {
            let name = header.split("]]").next().unwrap_or_default();
            if let Ok(segments) = path::split(name) {
                annotations
                    .entry(path::join(&segments))
                    .or_insert_with(|| Annotation {
                        line: number,
                        comments: std::mem::take(&mut comments),
                    });
            }
            comments.clear();
            table = None;
        } else if let Some(header) = trimmed.strip_prefix('[') {
            let name = header.split(']').next().unwrap_or_default();
            table = path::split(name).ok();
            comments.clear();
        } else if let Some((key, value)) = path::split_key_value(trimmed) {
            if let (Some(prefix), Ok(segments)) = (&table, path::split(key)) {
                let full: Vec<&String> = prefix.iter().chain(segments.iter()).collect();
                annotations.insert(
                    path::join(full),
                    Annotation {
                        line: number,
                        comments: std::mem::take(&mut comments),
                    },
                );
            }
            comments.clear();
            scanner.scan(value);
        } else {
            comments.clear();
        }
    }

    annotations
}

/// Tracks whether a value continues past the end of the current line.
#[derive(Debug, Default)]
struct Scanner {
    depth: usize,
    multiline: Option<char>,
}

impl Scanner {
    fn in_value(&self) -> bool {
        self.depth > 0 || self.multiline.is_some()
    }

    fn scan(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];

            if let Some(q) = self.multiline {
                if q == '"' && c == '\\' {
                    i += 2;
                    continue;
                }
                if starts_triple(&chars[i..], q) {
                    self.multiline = None;
                    i += 3;
                    continue;
                }
                i += 1;
                continue;
            }

            match c {
                '#' => return,
                '"' | '\'' if starts_triple(&chars[i..], c) => {
                    self.multiline = Some(c);
                    i += 3;
                    continue;
                }
                '"' | '\'' => {
                    i += 1;
                    while i < chars.len() && chars[i] != c {
                        if c == '"' && chars[i] == '\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                }
                '[' | '{' => self.depth += 1,
                ']' | '}' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
            i += 1;
        }
    }
}

fn starts_triple(rest: &[char], quote: char) -> bool {
    rest.starts_with(&[quote, quote, quote])
}
