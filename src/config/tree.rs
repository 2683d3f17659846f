//! The immutable configuration tree.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use toml::{Table, Value};

use super::origin::Origin;
use super::{path, ConfigError};

/// The shape of the value stored at a path.
///
/// Used to decide how an untyped override string must be typed without
/// attempting reads and inspecting their failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Absent,
    Scalar,
    Object,
    /// A list whose elements are all scalars. The empty list is a scalar list.
    ScalarList,
    /// A non-empty list whose elements are all objects.
    ObjectList,
    /// A list mixing objects and scalars, or holding nested lists.
    MixedList,
}

/// A hierarchical configuration with per-value provenance.
///
/// Values are addressed by dotted paths (see [`path`](super::path)). Every
/// operation returns a new `Config`; nothing is modified in place.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub(super) root: Table,
    pub(super) origins: BTreeMap<String, Origin>,
}

impl Config {
    /// A config with no values.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps a table, attributing every value in it to `origin`.
    pub fn from_table(table: Table, origin: Origin) -> Self {
        let origins = leaf_paths_of(&table)
            .into_iter()
            .map(|leaf| (leaf, origin.clone()))
            .collect();
        Self {
            root: table,
            origins,
        }
    }

    /// Builds a config holding a single value at `path`.
    pub fn from_path_value(path: &str, value: Value, origin: Origin) -> Result<Self, ConfigError> {
        let segments = path::split(path)?;
        Ok(Self::from_table(nest(&segments, value), origin))
    }

    /// Parses TOML text, attributing every value in it to `origin`.
    pub fn parse_str(text: &str, origin: Origin) -> Result<Self, ConfigError> {
        let table: Table = toml::from_str(text).map_err(|e| ConfigError::ParseError {
            origin: origin.describe().to_string(),
            source: e,
        })?;
        Ok(Self::from_table(table, origin))
    }

    pub(super) fn from_parts(root: Table, origins: BTreeMap<String, Origin>) -> Self {
        Self { root, origins }
    }

    /// The underlying value tree.
    pub fn root(&self) -> &Table {
        &self.root
    }

    /// Returns true if the config holds no leaf values.
    pub fn is_empty(&self) -> bool {
        self.leaf_paths().is_empty()
    }

    /// Returns the value at `path`, if any.
    pub fn get(&self, path: &str) -> Result<Option<&Value>, ConfigError> {
        let segments = path::split(path)?;
        Ok(lookup(&self.root, &segments))
    }

    pub fn has_path(&self, path: &str) -> bool {
        matches!(self.get(path), Ok(Some(_)))
    }

    /// Reads a scalar as a string. Non-string scalars use their TOML rendering.
    pub fn get_string(&self, path: &str) -> Result<String, ConfigError> {
        let value = self.require(path)?;
        scalar_to_string(value).ok_or_else(|| mismatch(path, "a scalar", value))
    }

    /// Reads a list whose elements are all scalars.
    pub fn get_string_list(&self, path: &str) -> Result<Vec<String>, ConfigError> {
        let value = self.require(path)?;
        let items = value
            .as_array()
            .ok_or_else(|| mismatch(path, "a list of scalars", value))?;
        items
            .iter()
            .map(scalar_to_string)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| mismatch(path, "a list of scalars", value))
    }

    /// Reads a list whose elements are all objects.
    pub fn get_object_list(&self, path: &str) -> Result<Vec<&Table>, ConfigError> {
        let value = self.require(path)?;
        let items = value
            .as_array()
            .ok_or_else(|| mismatch(path, "a list of objects", value))?;
        items
            .iter()
            .map(Value::as_table)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| mismatch(path, "a list of objects", value))
    }

    /// Classifies the value at `path`. Malformed paths are reported as absent.
    pub fn kind_of(&self, path: &str) -> PathKind {
        match self.get(path) {
            Ok(Some(Value::Table(_))) => PathKind::Object,
            Ok(Some(Value::Array(items))) => {
                if items.iter().all(is_scalar) {
                    PathKind::ScalarList
                } else if items.iter().all(Value::is_table) {
                    PathKind::ObjectList
                } else {
                    PathKind::MixedList
                }
            }
            Ok(Some(_)) => PathKind::Scalar,
            Ok(None) | Err(_) => PathKind::Absent,
        }
    }

    /// All leaf paths, sorted. Lists are leaves; empty objects have none.
    pub fn leaf_paths(&self) -> BTreeSet<String> {
        leaf_paths_of(&self.root)
    }

    /// The config holding only the value at `path`. Empty if there is none.
    pub fn restrict_to_path(&self, path: &str) -> Self {
        let restricted = path::split(path)
            .ok()
            .and_then(|segments| lookup(&self.root, &segments).map(|v| nest(&segments, v.clone())))
            .unwrap_or_default();
        self.with_root(restricted)
    }

    /// The config without the value at `path`. Missing paths are a no-op.
    pub fn exclude_path(&self, path: &str) -> Self {
        let Ok(segments) = path::split(path) else {
            return self.clone();
        };
        let Some((last, parents)) = segments.split_last() else {
            return self.clone();
        };

        let mut root = self.root.clone();
        let mut table = &mut root;
        for segment in parents {
            match table.get_mut(segment) {
                Some(Value::Table(nested)) => table = nested,
                _ => return self.clone(),
            }
        }
        table.remove(last);
        self.with_root(root)
    }

    /// Merges `fallback` underneath this config.
    ///
    /// Objects are merged key by key. On any other conflict the value in
    /// `self` wins whole, so lists are replaced rather than concatenated.
    /// Each resulting value keeps the origin of the side that supplied it.
    pub fn with_fallback(&self, fallback: &Config) -> Self {
        let mut root = self.root.clone();
        merge_fallback(&mut root, &fallback.root);

        let own = self.leaf_paths();
        let origins = leaf_paths_of(&root)
            .into_iter()
            .filter_map(|leaf| {
                let source = if own.contains(&leaf) { self } else { fallback };
                source.origins.get(&leaf).cloned().map(|o| (leaf, o))
            })
            .collect();

        Self { root, origins }
    }

    /// Provenance of the leaf at `path`.
    pub fn origin_of(&self, path: &str) -> Option<&Origin> {
        let canonical = path::join(&path::split(path).ok()?);
        self.origins.get(&canonical)
    }

    /// Renders the config as compact TOML text.
    pub fn render(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(&self.root)?)
    }

    /// Deserializes the config into a typed structure.
    pub fn try_deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Value::Table(self.root.clone())
            .try_into()
            .map_err(ConfigError::DeserializeError)
    }

    /// Converts override strings back to the scalar types `base` uses.
    ///
    /// A string leaf becomes an integer, float or boolean when `base` holds
    /// that type at the same path and the string parses as one. Lists are
    /// converted item by item when every item of the `base` list has the
    /// same type and every string item parses. Anything else is unchanged.
    pub fn coerce_like(&self, base: &Config) -> Config {
        let mut root = self.root.clone();
        for (key, value) in root.iter_mut() {
            if let Some(like) = base.root.get(key) {
                coerce_value(value, like);
            }
        }
        Self {
            root,
            origins: self.origins.clone(),
        }
    }

    /// Rewrites the origin of every value.
    pub fn map_origins(self, mut f: impl FnMut(Origin) -> Origin) -> Self {
        let origins = self
            .origins
            .into_iter()
            .map(|(leaf, origin)| (leaf, f(origin)))
            .collect();
        Self {
            root: self.root,
            origins,
        }
    }

    fn require(&self, path: &str) -> Result<&Value, ConfigError> {
        self.get(path)?
            .ok_or_else(|| ConfigError::Missing(path.to_string()))
    }

    /// A config over `root` that keeps this config's origins for surviving leaves.
    fn with_root(&self, root: Table) -> Self {
        let leaves = leaf_paths_of(&root);
        let origins = self
            .origins
            .iter()
            .filter(|(leaf, _)| leaves.contains(*leaf))
            .map(|(leaf, origin)| (leaf.clone(), origin.clone()))
            .collect();
        Self { root, origins }
    }
}

/// Renders a scalar as a string, or `None` for lists and objects.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Table(_) => None,
        other => Some(other.to_string()),
    }
}

fn coerce_value(value: &mut Value, like: &Value) {
    match (value, like) {
        (Value::Table(table), Value::Table(like)) => {
            for (key, value) in table.iter_mut() {
                if let Some(like) = like.get(key) {
                    coerce_value(value, like);
                }
            }
        }
        (Value::Array(items), Value::Array(like)) => {
            let Some(first) = like.first() else {
                return;
            };
            if like.iter().any(|item| type_name(item) != type_name(first)) {
                return;
            }
            let coerced: Option<Vec<Value>> = items
                .iter()
                .map(|item| match item {
                    Value::String(text) => coerce_scalar(text, first),
                    other => Some(other.clone()),
                })
                .collect();
            if let Some(coerced) = coerced {
                *items = coerced;
            }
        }
        (value, like) => {
            let coerced = value.as_str().and_then(|text| coerce_scalar(text, like));
            if let Some(coerced) = coerced {
                *value = coerced;
            }
        }
    }
}

fn coerce_scalar(text: &str, like: &Value) -> Option<Value> {
    let text = text.trim();
    match like {
        Value::Integer(_) => text.parse().ok().map(Value::Integer),
        Value::Float(_) => text.parse().ok().map(Value::Float),
        Value::Boolean(_) if text.eq_ignore_ascii_case("true") => Some(Value::Boolean(true)),
        Value::Boolean(_) if text.eq_ignore_ascii_case("false") => Some(Value::Boolean(false)),
        _ => None,
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Table(_))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "a string",
        Value::Integer(_) => "an integer",
        Value::Float(_) => "a float",
        Value::Boolean(_) => "a boolean",
        Value::Datetime(_) => "a datetime",
        Value::Array(_) => "a list",
        Value::Table(_) => "an object",
    }
}

fn mismatch(path: &str, expected: &'static str, found: &Value) -> ConfigError {
    ConfigError::TypeMismatch {
        path: path.to_string(),
        expected,
        found: type_name(found),
    }
}

pub(super) fn lookup<'a>(root: &'a Table, segments: &[String]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = root.get(first)?;
    for segment in rest {
        current = current.as_table()?.get(segment)?;
    }
    Some(current)
}

/// Wraps `value` in one table per segment.
fn nest(segments: &[String], value: Value) -> Table {
    let mut value = value;
    for segment in segments.iter().rev() {
        let mut table = Table::new();
        table.insert(segment.clone(), value);
        value = Value::Table(table);
    }
    match value {
        Value::Table(table) => table,
        _ => Table::new(),
    }
}

pub(super) fn leaf_paths_of(table: &Table) -> BTreeSet<String> {
    fn collect(table: &Table, prefix: &mut Vec<String>, out: &mut BTreeSet<String>) {
        for (key, value) in table {
            prefix.push(key.clone());
            match value {
                Value::Table(nested) => collect(nested, prefix, out),
                _ => {
                    out.insert(path::join(prefix.iter()));
                }
            }
            prefix.pop();
        }
    }

    let mut out = BTreeSet::new();
    collect(table, &mut Vec::new(), &mut out);
    out
}

fn merge_fallback(winner: &mut Table, fallback: &Table) {
    for (key, value) in fallback {
        match (winner.get_mut(key), value) {
            (Some(Value::Table(winner_table)), Value::Table(fallback_table)) => {
                merge_fallback(winner_table, fallback_table);
            }
            (Some(_), _) => {}
            (None, value) => {
                winner.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Config {
        Config::parse_str(text, Origin::described("test")).unwrap()
    }

    #[test]
    fn test_leaf_paths_skip_objects_and_keep_lists() {
        let config = parse(
            r#"
            name = "app"
            empty = {}
            tags = ["a", "b"]

            [server]
            host = "localhost"
            "dotted.key" = 1

            [[servers]]
            host = "a"
            "#,
        );
        let paths: Vec<_> = config.leaf_paths().into_iter().collect();
        assert_eq!(
            paths,
            vec![
                "name",
                r#"server."dotted.key""#,
                "server.host",
                "servers",
                "tags",
            ]
        );
    }

    #[test]
    fn test_get_string_coerces_scalars() {
        let config = parse(
            r#"
            s = "text"
            i = 42
            f = 1.5
            b = true
            list = [1, 2]
            "#,
        );
        assert_eq!(config.get_string("s").unwrap(), "text");
        assert_eq!(config.get_string("i").unwrap(), "42");
        assert_eq!(config.get_string("f").unwrap(), "1.5");
        assert_eq!(config.get_string("b").unwrap(), "true");
        assert!(matches!(
            config.get_string("list"),
            Err(ConfigError::TypeMismatch { .. })
        ));
        assert!(matches!(
            config.get_string("nope"),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn test_get_lists() {
        let config = parse(
            r#"
            ports = [80, 443]
            servers = [{ host = "a" }, { host = "b" }]
            "#,
        );
        assert_eq!(config.get_string_list("ports").unwrap(), vec!["80", "443"]);
        assert!(config.get_string_list("servers").is_err());

        let servers = config.get_object_list("servers").unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[1]["host"].as_str(), Some("b"));
        assert!(config.get_object_list("ports").is_err());
    }

    #[test]
    fn test_kind_of() {
        let config = parse(
            r#"
            scalar = 1
            empty = []
            list = ["x"]
            objects = [{ a = 1 }]
            mixed = [1, { a = 1 }]
            nested = [[1], [2]]
            [object]
            a = 1
            "#,
        );
        assert_eq!(config.kind_of("scalar"), PathKind::Scalar);
        assert_eq!(config.kind_of("empty"), PathKind::ScalarList);
        assert_eq!(config.kind_of("list"), PathKind::ScalarList);
        assert_eq!(config.kind_of("objects"), PathKind::ObjectList);
        assert_eq!(config.kind_of("mixed"), PathKind::MixedList);
        assert_eq!(config.kind_of("nested"), PathKind::MixedList);
        assert_eq!(config.kind_of("object"), PathKind::Object);
        assert_eq!(config.kind_of("missing.path"), PathKind::Absent);
        assert_eq!(config.kind_of("scalar.below"), PathKind::Absent);
    }

    #[test]
    fn test_restrict_and_exclude() {
        let config = parse(
            r#"
            [db]
            host = "h"
            port = 5432
            [app]
            name = "n"
            "#,
        );

        let restricted = config.restrict_to_path("db.port");
        assert_eq!(
            restricted.leaf_paths().into_iter().collect::<Vec<_>>(),
            vec!["db.port"]
        );
        assert!(config.restrict_to_path("db.nope").is_empty());

        let excluded = config.exclude_path("db");
        assert_eq!(
            excluded.leaf_paths().into_iter().collect::<Vec<_>>(),
            vec!["app.name"]
        );
        assert!(excluded.origin_of("db.host").is_none());
        assert_eq!(
            config.exclude_path("app.name.deeper").leaf_paths(),
            config.leaf_paths()
        );
    }

    #[test]
    fn test_with_fallback_prefers_receiver() {
        let top = Config::parse_str(
            r#"
            tags = ["x"]
            [db]
            host = "top"
            "#,
            Origin::described("top"),
        )
        .unwrap();
        let bottom = Config::parse_str(
            r#"
            tags = ["a", "b"]
            [db]
            host = "bottom"
            port = 5432
            "#,
            Origin::described("bottom"),
        )
        .unwrap();

        let merged = top.with_fallback(&bottom);
        assert_eq!(merged.get_string("db.host").unwrap(), "top");
        assert_eq!(merged.get_string("db.port").unwrap(), "5432");
        assert_eq!(merged.get_string_list("tags").unwrap(), vec!["x"]);
        assert_eq!(merged.origin_of("db.host").unwrap().describe(), "top");
        assert_eq!(merged.origin_of("db.port").unwrap().describe(), "bottom");
    }

    #[test]
    fn test_with_fallback_scalar_shadows_object() {
        let top = Config::from_path_value("db", Value::String("off".into()), Origin::default())
            .unwrap();
        let bottom = parse("[db]\nhost = \"h\"");
        let merged = top.with_fallback(&bottom);
        assert_eq!(merged.get_string("db").unwrap(), "off");
        assert!(!merged.has_path("db.host"));
    }

    #[test]
    fn test_from_path_value_nests() {
        let config =
            Config::from_path_value("a.b.c", Value::Integer(1), Origin::described("x")).unwrap();
        assert_eq!(config.get_string("a.b.c").unwrap(), "1");
        assert!(config.has_path("a.b"));
        assert_eq!(config.origin_of("a . b . c").unwrap().describe(), "x");
    }

    #[test]
    fn test_render_and_deserialize() {
        #[derive(serde::Deserialize)]
        struct Db {
            host: String,
            port: u16,
        }
        #[derive(serde::Deserialize)]
        struct App {
            db: Db,
        }

        let config = parse("[db]\nhost = \"h\"\nport = 5432");
        let app: App = config.try_deserialize().unwrap();
        assert_eq!(app.db.host, "h");
        assert_eq!(app.db.port, 5432);

        let reparsed = parse(&config.render().unwrap());
        assert_eq!(reparsed.root(), config.root());
    }

    #[test]
    fn test_coerce_like_restores_base_types() {
        #[derive(Debug, serde::Deserialize)]
        struct Server {
            port: u16,
            ratio: f64,
            debug: bool,
            name: String,
            ids: Vec<i64>,
            tags: Vec<String>,
        }
        #[derive(Debug, serde::Deserialize)]
        struct App {
            server: Server,
        }

        let base = parse(
            "[server]\nport = 8080\nratio = 0.5\ndebug = false\nname = \"x\"\nids = [1]\ntags = [\"a\"]",
        );
        let overridden = parse(
            r#"
            [server]
            port = "9090"
            ratio = "1.5"
            debug = "TRUE"
            name = "42"
            ids = ["3", "4"]
            tags = ["5"]
            "#,
        );

        let app: App = overridden.coerce_like(&base).try_deserialize().unwrap();
        let server = app.server;
        assert_eq!(server.port, 9090);
        assert_eq!(server.ratio, 1.5);
        assert!(server.debug);
        assert_eq!(server.name, "42");
        assert_eq!(server.ids, vec![3, 4]);
        assert_eq!(server.tags, vec!["5"]);
    }

    #[test]
    fn test_coerce_like_leaves_unparseable_strings() {
        let base = parse("port = 8080");
        let coerced = parse(r#"port = "eighty""#).coerce_like(&base);
        assert_eq!(coerced.get("port").unwrap(), Some(&Value::String("eighty".into())));
    }
}
