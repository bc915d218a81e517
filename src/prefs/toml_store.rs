//! File-backed preference store.
//!
//! The file is a flat TOML table of `key = value` pairs:
//!
//! ```toml
//! auto-hide-delay-ms = 1500
//! show-on-keyboard-activity = true
//! ```
//!
//! A missing file is an empty store. Entries that are neither a boolean nor an
//! integer are skipped with a warning. Every `set` rewrites the whole file.

use super::{PrefError, PrefStore, PrefValue};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "immersive-fullscreen";
const PREFS_FILE: &str = "prefs.toml";

#[derive(Debug, Clone)]
pub struct TomlPrefStore {
    path: PathBuf,
    values: BTreeMap<String, PrefValue>,
}

impl TomlPrefStore {
    /// Opens the store at `path`, reading it if it exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefError> {
        let path = path.into();

        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let table: BTreeMap<String, toml::Value> = toml::from_str(&content)?;
            let values = table
                .into_iter()
                .filter_map(|(key, value)| match value {
                    toml::Value::Boolean(value) => Some((key, PrefValue::Bool(value))),
                    toml::Value::Integer(value) => Some((key, PrefValue::Int(value))),
                    other => {
                        warn!(
                            "Ignoring preference {} with unsupported {} value",
                            key,
                            other.type_str()
                        );
                        None
                    }
                })
                .collect::<BTreeMap<_, _>>();
            info!("Loaded {} preferences from {}", values.len(), path.display());
            values
        } else {
            debug!("No preference file at {}, starting empty", path.display());
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    /// Opens the store at the platform configuration directory.
    pub fn open_default() -> Result<Self, PrefError> {
        Self::open(default_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes all values to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<(), PrefError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(&self.values)?;
        fs::write(&self.path, content)?;
        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }
}

impl PrefStore for TomlPrefStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.get(key).copied()
    }

    /// Memory only changes when the file write succeeds.
    fn set(&mut self, key: &str, value: PrefValue) -> Result<(), PrefError> {
        let previous = self.values.insert(key.to_string(), value);

        if let Err(e) = self.save() {
            match previous {
                Some(previous) => self.values.insert(key.to_string(), previous),
                None => self.values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

/// `<config dir>/immersive-fullscreen/prefs.toml`
pub fn default_path() -> Result<PathBuf, PrefError> {
    let mut path = dirs::config_dir().ok_or(PrefError::NoConfigDir)?;
    path.push(CONFIG_DIR);
    path.push(PREFS_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::keys;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = TomlPrefStore::open(dir.path().join("prefs.toml")).unwrap();

        assert!(store.get(keys::AUTO_HIDE_DELAY_MS).is_none());
        assert_eq!(store.get_int(keys::AUTO_HIDE_DELAY_MS), 2000);
    }

    #[test]
    fn set_writes_through_and_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("prefs.toml");

        let mut store = TomlPrefStore::open(&path).unwrap();
        store.set_bool(keys::HAS_SEEN_INTRODUCTION, true).unwrap();
        store.set_int(keys::AUTO_HIDE_DELAY_MS, 1500).unwrap();
        assert!(path.exists());

        let reopened = TomlPrefStore::open(&path).unwrap();
        assert!(reopened.get_bool(keys::HAS_SEEN_INTRODUCTION));
        assert_eq!(reopened.get_int(keys::AUTO_HIDE_DELAY_MS), 1500);
    }

    #[test]
    fn reads_hand_written_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(
            &path,
            "top-edge-sensitivity-px = 12\nshow-on-keyboard-activity = true\n",
        )
        .unwrap();

        let store = TomlPrefStore::open(&path).unwrap();
        assert_eq!(store.get_int(keys::TOP_EDGE_SENSITIVITY_PX), 12);
        assert!(store.get_bool(keys::SHOW_ON_KEYBOARD_ACTIVITY));
    }

    #[test]
    fn entries_of_other_types_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(
            &path,
            "auto-hide-delay-ms = 1500.0\nshow-on-keyboard-activity = true\nnote = \"hi\"\n",
        )
        .unwrap();

        let store = TomlPrefStore::open(&path).unwrap();
        assert!(store.get(keys::AUTO_HIDE_DELAY_MS).is_none());
        assert_eq!(store.get_int(keys::AUTO_HIDE_DELAY_MS), 2000);
        assert!(store.get_bool(keys::SHOW_ON_KEYBOARD_ACTIVITY));
        assert!(store.get("note").is_none());
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = TempDir::new().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let mut store = TomlPrefStore::open(blocker.join("prefs.toml")).unwrap();

        let result = store.set_bool(keys::HAS_SEEN_INTRODUCTION, true);

        assert!(matches!(result, Err(PrefError::Io(_))));
        assert!(store.get(keys::HAS_SEEN_INTRODUCTION).is_none());
        assert!(!store.get_bool(keys::HAS_SEEN_INTRODUCTION));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(&path, "auto-hide-delay-ms = = 3").unwrap();

        let result = TomlPrefStore::open(&path);
        assert!(matches!(result, Err(PrefError::Parse(_))));
    }
}
