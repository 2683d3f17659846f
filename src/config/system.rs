//! The process environment and host properties viewed as configuration.

use std::path::MAIN_SEPARATOR;

use toml::{Table, Value};

use super::origin::Origin;
use super::Config;

/// Every environment variable as a top-level string value.
///
/// Variable names are used verbatim as single path segments, so `PATH`
/// becomes the path `PATH` and `ProgramFiles(x86)` becomes
/// `"ProgramFiles(x86)"`. Variables that are not valid unicode are skipped.
pub fn system_environment() -> Config {
    let table: Table = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key, Value::String(value)))
        .collect();
    Config::from_table(table, Origin::described("system environment"))
}

/// Host and process properties, keyed the way JVM-style tools expect them.
///
/// Provides `os.name`, `os.arch`, `os.family`, `file.separator`,
/// `path.separator` and `line.separator` always; `user.dir` and `user.home`
/// when they can be determined.
pub fn system_properties() -> Config {
    let mut os = Table::new();
    os.insert("name".into(), std::env::consts::OS.into());
    os.insert("arch".into(), std::env::consts::ARCH.into());
    os.insert("family".into(), std::env::consts::FAMILY.into());

    let path_separator = if cfg!(windows) { ";" } else { ":" };
    let line_separator = if cfg!(windows) { "\r\n" } else { "\n" };

    let mut table = Table::new();
    table.insert("os".into(), Value::Table(os));
    table.insert("file".into(), separator(&MAIN_SEPARATOR.to_string()));
    table.insert("path".into(), separator(path_separator));
    table.insert("line".into(), separator(line_separator));

    let mut user = Table::new();
    if let Ok(dir) = std::env::current_dir() {
        user.insert("dir".into(), Value::String(dir.display().to_string()));
    }
    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        user.insert("home".into(), Value::String(home.to_string_lossy().into_owned()));
    }
    if !user.is_empty() {
        table.insert("user".into(), Value::Table(user));
    }

    Config::from_table(table, Origin::described("system properties"))
}

fn separator(value: &str) -> Value {
    let mut entry = Table::new();
    entry.insert("separator".into(), value.into());
    Value::Table(entry)
}
