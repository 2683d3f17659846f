//! Set-like operations over a config's leaf paths.

use std::collections::BTreeSet;

use crate::config::{path, system_environment, system_properties, Config};

impl Config {
    /// All leaf paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.leaf_paths().into_iter().collect()
    }

    /// The distinct first segments of all leaf paths, sorted.
    pub fn path_roots(&self) -> Vec<String> {
        self.leaf_paths()
            .iter()
            .filter_map(|leaf| path::root(leaf))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The config without any of `paths`. Paths that don't exist are ignored.
    pub fn without<I, S>(&self, paths: I) -> Config
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .fold(self.clone(), |config, path| config.exclude_path(path.as_ref()))
    }

    /// The config holding only `paths`. No paths gives an empty config.
    pub fn with_paths<I, S>(&self, paths: I) -> Config
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths.into_iter().fold(Config::empty(), |config, path| {
            config.with_fallback(&self.restrict_to_path(path.as_ref()))
        })
    }

    /// The values of `self` at the paths `other` defines.
    pub fn intersect(&self, other: &Config) -> Config {
        self.with_paths(other.leaf_paths())
    }

    /// The values of `self` at paths `other` does not define.
    pub fn difference(&self, other: &Config) -> Config {
        self.without(other.leaf_paths())
    }

    /// Drops every path the environment or host properties also supply,
    /// leaving the configuration a user actually wrote.
    pub fn without_system(&self) -> Config {
        self.difference(&system_environment())
            .difference(&system_properties())
    }

    /// Keeps the leaf paths matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&str) -> bool) -> Config {
        self.with_paths(self.leaf_paths().into_iter().filter(|leaf| predicate(leaf)))
    }

    /// Drops the leaf paths matching `predicate`.
    pub fn filter_not(&self, predicate: impl Fn(&str) -> bool) -> Config {
        self.filter(|leaf| !predicate(leaf))
    }
}
