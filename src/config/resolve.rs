//! `${path}` references between configuration values.
//!
//! A string value may embed `${section.field}`, which is replaced by the
//! scalar at that path. A reference that names no config value falls back to
//! the environment variable of that name, so `${HOME}` works without a `HOME`
//! key. `$$` produces a literal `$`.

use std::collections::BTreeMap;

use toml::{Table, Value};
use tracing::trace;

use super::tree::{lookup, scalar_to_string};
use super::{path, Config, ConfigError};

impl Config {
    /// Substitutes every `${path}` reference in string values.
    ///
    /// Origins are unchanged: a resolved value is still attributed to the
    /// source that wrote the reference.
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        let mut resolver = Resolver {
            root: &self.root,
            resolved: BTreeMap::new(),
            stack: Vec::new(),
        };
        let mut root = self.root.clone();
        resolver.rewrite_table(&mut root)?;
        trace!(references = resolver.resolved.len(), "resolved references");
        Ok(Config::from_parts(root, self.origins.clone()))
    }
}

impl Config {
    /// Escapes every `$` in string values, so [`resolve`](Self::resolve)
    /// yields them exactly as written.
    pub fn escape_references(self) -> Config {
        let mut root = self.root;
        for (_, value) in root.iter_mut() {
            escape_value(value);
        }
        Config::from_parts(root, self.origins)
    }
}

fn escape_value(value: &mut Value) {
    match value {
        Value::String(text) if text.contains('$') => *text = text.replace('$', "$$"),
        Value::Table(table) => {
            for (_, value) in table.iter_mut() {
                escape_value(value);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(escape_value),
        _ => {}
    }
}

#[derive(Debug, PartialEq)]
enum Piece<'a> {
    Text(&'a str),
    Reference(&'a str),
}

/// Splits `text` into literal runs and references.
fn pieces(text: &str) -> Result<Vec<Piece<'_>>, ConfigError> {
    let mut pieces = Vec::new();
    let mut rest = text;

    while let Some(at) = rest.find('$') {
        if at > 0 {
            pieces.push(Piece::Text(&rest[..at]));
        }
        let after = &rest[at + 1..];
        if let Some(tail) = after.strip_prefix('$') {
            pieces.push(Piece::Text("$"));
            rest = tail;
        } else if let Some(body) = after.strip_prefix('{') {
            let end = body.find('}').ok_or(ConfigError::UnclosedReference)?;
            pieces.push(Piece::Reference(&body[..end]));
            rest = &body[end + 1..];
        } else {
            pieces.push(Piece::Text("$"));
            rest = after;
        }
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }

    Ok(pieces)
}

/// Expands references depth-first against the unresolved tree.
///
/// Each referenced path is expanded once and remembered. `stack` holds the
/// paths currently being expanded, so a path that reaches itself again is
/// a cycle.
struct Resolver<'a> {
    root: &'a Table,
    resolved: BTreeMap<String, String>,
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn rewrite_table(&mut self, table: &mut Table) -> Result<(), ConfigError> {
        for (_, value) in table.iter_mut() {
            self.rewrite_value(value)?;
        }
        Ok(())
    }

    fn rewrite_value(&mut self, value: &mut Value) -> Result<(), ConfigError> {
        match value {
            Value::String(text) => *text = self.expand(text)?,
            Value::Table(table) => self.rewrite_table(table)?,
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.rewrite_value(item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn expand(&mut self, text: &str) -> Result<String, ConfigError> {
        let mut expanded = String::with_capacity(text.len());
        for piece in pieces(text)? {
            match piece {
                Piece::Text(literal) => expanded.push_str(literal),
                Piece::Reference(reference) => expanded.push_str(&self.reference(reference)?),
            }
        }
        Ok(expanded)
    }

    fn reference(&mut self, reference: &str) -> Result<String, ConfigError> {
        let segments = path::split(reference)
            .map_err(|_| ConfigError::InvalidReferencePath(reference.to_string()))?;
        let key = path::join(&segments);

        if let Some(done) = self.resolved.get(&key) {
            return Ok(done.clone());
        }
        if self.stack.contains(&key) {
            let mut chain = self.stack.clone();
            chain.push(key);
            return Err(ConfigError::CircularReference(chain.join(" -> ")));
        }

        let root = self.root;
        let value = match lookup(root, &segments) {
            Some(Value::String(text)) => {
                self.stack.push(key.clone());
                let expanded = self.expand(text);
                self.stack.pop();
                expanded?
            }
            Some(other) => scalar_to_string(other)
                .ok_or_else(|| ConfigError::NonScalarReference(reference.to_string()))?,
            None => std::env::var(reference)
                .map_err(|_| ConfigError::ReferenceNotFound(reference.to_string()))?,
        };

        self.resolved.insert(key, value.clone());
        Ok(value)
    }
}
