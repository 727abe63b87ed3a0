//! TOML-backed configuration store for hitdesk.
//!
//! The shell and its collaborators read and write settings through a single
//! [`ConfigStore`]: a section/key/value document persisted to disk. Commands
//! that change operating parameters (`mode`, `create_hit`) write through the
//! store so the next session starts where the operator left off.

use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::Value;
use toml::map::Map;
use tracing::debug;

/// Errors raised by the configuration store.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error("config i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The in-memory document could not be serialized.
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Section/key/value configuration document backed by a TOML file.
///
/// Sections are top-level tables; values are plain TOML values. Reads of a
/// missing section or key return `None` rather than erroring, so callers can
/// layer their own defaults.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    doc: Map<String, Value>,
}

impl ConfigStore {
    /// Load the store from `path`. A missing file yields the default
    /// document, which is written back on the first [`ConfigStore::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let doc = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            toml::from_str(&raw)?
        } else {
            debug!(path = %path.display(), "config file missing, using defaults");
            default_document()
        };
        Ok(Self { path, doc })
    }

    /// Construct an in-memory store that is never persisted. Used by tests
    /// and by callers that only need the defaults.
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            doc: default_document(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch a value, or `None` if the section or key is absent.
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.doc.get(section)?.as_table()?.get(key)
    }

    /// Fetch a string value.
    pub fn get_str(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key)?.as_str()
    }

    /// Fetch a boolean value.
    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        self.get(section, key)?.as_bool()
    }

    /// Fetch an integer value.
    pub fn get_int(&self, section: &str, key: &str) -> Option<i64> {
        self.get(section, key)?.as_integer()
    }

    /// Set a value, creating the section if needed. The change is in-memory
    /// until [`ConfigStore::save`] is called.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<Value>) {
        let table = self
            .doc
            .entry(section.to_string())
            .or_insert_with(|| Value::Table(Map::new()));
        if let Value::Table(table) = table {
            table.insert(key.to_string(), value.into());
        }
    }

    /// Persist the document to the backing file.
    pub fn save(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }
        let rendered = toml::to_string_pretty(&Value::Table(self.doc.clone()))?;
        std::fs::write(&self.path, rendered)?;
        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    /// The raw on-disk contents, for `print_config`. Falls back to the
    /// serialized in-memory document when the file does not exist yet.
    pub fn raw_contents(&self) -> Result<String, ConfigError> {
        if self.path.exists() {
            Ok(std::fs::read_to_string(&self.path)?)
        } else {
            Ok(toml::to_string_pretty(&Value::Table(self.doc.clone()))?)
        }
    }
}

/// Default configuration document for a fresh install.
fn default_document() -> Map<String, Value> {
    let raw = r#"
[hit]
using_sandbox = true
max_assignments = 1
reward = "1.00"
duration = 1

[marketplace]
sandbox_endpoint = "https://sandbox.marketplace.example.com"
live_endpoint = "https://marketplace.example.com"
api_token = ""

[server]
host = "localhost"
port = 22362
command = "experiment-server"
poll_interval_ms = 1000
wait_timeout_secs = 60
"#;
    toml::from_str(raw).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_present_without_file() {
        let store = ConfigStore::in_memory();
        assert_eq!(store.get_bool("hit", "using_sandbox"), Some(true));
        assert_eq!(store.get_str("server", "host"), Some("localhost"));
        assert_eq!(store.get_int("server", "port"), Some(22362));
    }

    #[test]
    fn missing_section_and_key_return_none() {
        let store = ConfigStore::in_memory();
        assert!(store.get("nope", "missing").is_none());
        assert!(store.get_str("hit", "missing").is_none());
    }

    #[test]
    fn set_creates_section_and_overwrites() {
        let mut store = ConfigStore::in_memory();
        store.set("hit", "using_sandbox", false);
        store.set("extra", "note", "hello");
        assert_eq!(store.get_bool("hit", "using_sandbox"), Some(false));
        assert_eq!(store.get_str("extra", "note"), Some("hello"));
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hitdesk.toml");

        let mut store = ConfigStore::load(&path).unwrap();
        store.set("hit", "reward", "2.50");
        store.save().unwrap();

        let reloaded = ConfigStore::load(&path).unwrap();
        assert_eq!(reloaded.get_str("hit", "reward"), Some("2.50"));
    }

    #[test]
    fn raw_contents_matches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hitdesk.toml");

        let store = ConfigStore::load(&path).unwrap();
        store.save().unwrap();

        let raw = store.raw_contents().unwrap();
        assert!(raw.contains("using_sandbox"));
        assert_eq!(raw, std::fs::read_to_string(&path).unwrap());
    }
}
