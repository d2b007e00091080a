//! User preferences over an injected key/value store.
//!
//! Values are stored as JSON text under fixed keys. Loading never fails: a
//! missing or corrupt entry falls back to its default and is logged.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::PieceColor;
use crate::error::PersistenceError;

const WIDGETS_KEY: &str = "svc.widgets";
const THEME_KEY: &str = "svc.theme";
const SIDE_KEY: &str = "svc.side";
const SKILL_KEY: &str = "svc.skill";

/// Highest skill level the engine accepts
pub const MAX_SKILL_LEVEL: u8 = 20;

/// A string key/value store
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by one JSON object on disk, rewritten on every `set`
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing or unreadable file starts empty
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "preference file is corrupt, starting empty");
                BTreeMap::new()
            }),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no preference file");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        let text = serde_json::to_string_pretty(&self.entries).map_err(|e| PersistenceError::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, text)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preferences {
    /// Widget ids shown, in order
    pub widgets: Vec<String>,
    pub theme: Theme,
    /// Side the user last played
    pub side: PieceColor,
    pub skill_level: u8,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            widgets: vec!["about-widget".to_string()],
            theme: Theme::Auto,
            side: PieceColor::White,
            skill_level: 10,
        }
    }
}

impl Preferences {
    /// Read every key, substituting defaults for missing or corrupt values
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let defaults = Self::default();
        let skill_level = decode(store, SKILL_KEY, defaults.skill_level);
        Self {
            widgets: decode(store, WIDGETS_KEY, defaults.widgets),
            theme: decode(store, THEME_KEY, defaults.theme),
            side: decode(store, SIDE_KEY, defaults.side),
            skill_level: if skill_level > MAX_SKILL_LEVEL {
                warn!(skill_level, "stored skill level out of range");
                defaults.skill_level
            } else {
                skill_level
            },
        }
    }

    pub fn save(&self, store: &mut dyn PreferenceStore) -> Result<(), PersistenceError> {
        encode(store, WIDGETS_KEY, &self.widgets)?;
        encode(store, THEME_KEY, &self.theme)?;
        encode(store, SIDE_KEY, &self.side)?;
        encode(store, SKILL_KEY, &self.skill_level)
    }
}

fn decode<T: DeserializeOwned>(store: &dyn PreferenceStore, key: &str, default: T) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default,
        Err(e) => {
            warn!(key, error = %e, "preference unreadable, using default");
            return default;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            let err = PersistenceError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            };
            warn!(error = %err, "using default");
            default
        }
    }
}

fn encode<T: Serialize>(store: &mut dyn PreferenceStore, key: &str, value: &T) -> Result<(), PersistenceError> {
    let text = serde_json::to_string(value).map_err(|e| PersistenceError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_gives_defaults() {
        let store = MemoryStore::new();
        let prefs = Preferences::load(&store);
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.widgets, vec!["about-widget"]);
        assert_eq!(prefs.theme, Theme::Auto);
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let prefs = Preferences {
            widgets: vec!["knight-path".to_string(), "mate-trainer".to_string()],
            theme: Theme::Dark,
            side: PieceColor::Black,
            skill_level: 4,
        };
        prefs.save(&mut store).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("\"dark\""));
        assert_eq!(Preferences::load(&store), prefs);
    }

    #[test]
    fn test_corrupt_entries_fall_back_individually() {
        let mut store = MemoryStore::new();
        store.set(WIDGETS_KEY, "{not json").unwrap();
        store.set(THEME_KEY, "\"purple\"").unwrap();
        store.set(SIDE_KEY, "\"black\"").unwrap();
        store.set(SKILL_KEY, "99").unwrap();

        let prefs = Preferences::load(&store);
        assert_eq!(prefs.widgets, vec!["about-widget"]);
        assert_eq!(prefs.theme, Theme::Auto);
        assert_eq!(prefs.side, PieceColor::Black);
        assert_eq!(prefs.skill_level, 10);
    }

    #[test]
    fn test_widgets_must_be_strings() {
        let mut store = MemoryStore::new();
        store.set(WIDGETS_KEY, "[1, 2]").unwrap();
        assert_eq!(Preferences::load(&store).widgets, vec!["about-widget"]);
    }

    #[test]
    fn test_json_file_store() {
        let dir = std::env::temp_dir().join(format!("blindfold-prefs-{}", std::process::id()));
        let path = dir.join("prefs.json");
        let _ = fs::remove_file(&path);

        let mut store = JsonFileStore::open(&path);
        let prefs = Preferences {
            theme: Theme::Light,
            ..Preferences::default()
        };
        prefs.save(&mut store).unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(Preferences::load(&reopened), prefs);

        fs::write(&path, "garbage").unwrap();
        let corrupt = JsonFileStore::open(&path);
        assert_eq!(Preferences::load(&corrupt), Preferences::default());
        let _ = fs::remove_dir_all(&dir);
    }
}
