//! Client option files (`my.cnf`)
//!
//! Option files are INI-like: `[group]` headers followed by `key=value` or
//! bare `key` lines. Only the connection keys the pool cares about are
//! applied, the rest are kept but ignored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mysqlfs_core::{BackendConfig, Error, Result};

/// Group every MySQL client reads in addition to its own.
const CLIENT_GROUP: &str = "client";

/// Option files read by default, lowest precedence first
pub fn default_option_files() -> Vec<PathBuf> {
    let mut files = vec![
        PathBuf::from("/etc/my.cnf"),
        PathBuf::from("/etc/mysql/my.cnf"),
    ];
    if let Some(home) = dirs::home_dir() {
        files.push(home.join(".my.cnf"));
    }
    files
}

/// Key/value pairs collected from one or more option groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionValues {
    values: HashMap<String, String>,
}

impl OptionValues {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn merge(&mut self, other: HashMap<String, String>) {
        self.values.extend(other);
    }

    /// Fill every unset field of `config` from these values.
    ///
    /// Explicit configuration always wins over the option files.
    pub fn fill(&self, config: &BackendConfig) -> Result<BackendConfig> {
        let mut resolved = config.clone();

        if resolved.host.is_none() {
            resolved.host = self.get("host").map(str::to_string);
        }
        if resolved.port.is_none() {
            resolved.port = self
                .get("port")
                .map(|port| {
                    port.parse::<u16>().map_err(|e| {
                        Error::Config(format!("invalid port '{}' in option file: {}", port, e))
                    })
                })
                .transpose()?;
        }
        if resolved.socket_path.is_none() {
            resolved.socket_path = self.get("socket").map(PathBuf::from);
        }
        if resolved.user.is_none() {
            resolved.user = self.get("user").map(str::to_string);
        }
        if resolved.password.is_none() {
            resolved.password = self.get("password").map(str::to_string);
        }
        if resolved.database.is_none() {
            resolved.database = self.get("database").map(str::to_string);
        }

        Ok(resolved)
    }
}

/// `default-character-set` and `default_character_set` name the same option.
fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('-', "_")
}

/// Cut a trailing `# comment`; a `#` inside a quoted value is kept.
fn strip_comment(value: &str) -> &str {
    let value = value.trim();
    if let Some(quote) = value.chars().next().filter(|c| matches!(c, '"' | '\'')) {
        return match value[1..].find(quote) {
            Some(end) => &value[..end + 2],
            None => value,
        };
    }
    match value.find('#') {
        Some(index) => value[..index].trim_end(),
        None => value,
    }
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Parse option file contents, keeping only the listed groups.
///
/// Groups are merged in the order given, so later groups override earlier
/// ones regardless of where they appear in the file.
pub fn parse_option_groups(contents: &str, groups: &[&str]) -> OptionValues {
    let mut per_group: Vec<HashMap<String, String>> = vec![HashMap::new(); groups.len()];
    let mut current: Option<usize> = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        // !include and !includedir directives
        if line.starts_with('!') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header.trim_end_matches(']').trim();
            current = groups.iter().position(|g| g.eq_ignore_ascii_case(name));
            continue;
        }

        let Some(index) = current else {
            continue;
        };

        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key, unquote(strip_comment(value))),
            None => (strip_comment(line), ""),
        };
        per_group[index].insert(normalize_key(key), value.to_string());
    }

    let mut values = OptionValues::default();
    for group in per_group {
        values.merge(group);
    }
    values
}

/// Read the `client` group and `group` from every existing file in `files`.
///
/// Missing files are skipped; later files override earlier ones.
pub fn read_option_groups(files: &[PathBuf], group: &str) -> Result<OptionValues> {
    let groups = [CLIENT_GROUP, group];
    let mut values = OptionValues::default();

    for path in files {
        let Some(contents) = read_if_exists(path)? else {
            continue;
        };
        tracing::debug!(path = %path.display(), group = %group, "reading option file");
        values.merge(parse_option_groups(&contents, &groups).values);
    }

    Ok(values)
}

fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Io(e)),
    }
}
