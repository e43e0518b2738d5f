//! Settings persistence
//!
//! The store talks to a flat key/value `PreferenceBackend`: floats and ints
//! keyed by persistence name, plus an explicit `save` that makes pending
//! writes durable. Booleans are stored as 1/0 ints.
//!
//! Settings are stored in `~/.config/agit/settings.json` by default.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Durable key/value storage for preferences.
pub trait PreferenceBackend {
    fn get_float(&self, key: &str) -> Option<f32>;
    fn get_int(&self, key: &str) -> Option<i32>;
    fn set_float(&mut self, key: &str, value: f32);
    fn set_int(&mut self, key: &str, value: i32);
    /// Make every pending write durable.
    fn save(&mut self) -> Result<(), SettingsError>;
}

/// A single persisted scalar. Ints are tried first so `1` stays an int.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Int(i32),
    Float(f32),
}

impl StoredValue {
    fn as_f32(self) -> f32 {
        match self {
            StoredValue::Int(i) => i as f32,
            StoredValue::Float(f) => f,
        }
    }

    fn as_i32(self) -> i32 {
        match self {
            StoredValue::Int(i) => i,
            StoredValue::Float(f) if f.is_nan() => 0,
            StoredValue::Float(f) => f.round() as i32,
        }
    }
}

type ValueMap = BTreeMap<String, StoredValue>;

/// Get the path to the settings file
pub fn default_settings_path() -> Result<PathBuf, SettingsError> {
    dirs::config_dir()
        .map(|p| p.join("agit").join("settings.json"))
        .ok_or(SettingsError::NoConfigDir)
}

// ============================================================================
// JSON file backend
// ============================================================================

/// Preferences kept in a flat JSON object on disk.
///
/// Reads are served from memory; `save` rewrites the whole file.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    values: ValueMap,
}

impl JsonFileBackend {
    /// Open the settings file at `path`.
    ///
    /// A missing file is an empty store. A file that can't be read or parsed
    /// is logged and also treated as empty; it is overwritten on the next save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_values(&path) {
            Ok(values) => values,
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path.display(), e);
                ValueMap::new()
            }
        };
        Self { path, values }
    }

    /// Open the settings file at the default location
    pub fn open_default() -> Result<Self, SettingsError> {
        Ok(Self::open(default_settings_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of keys currently held (including ones this client doesn't know)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn read_values(path: &Path) -> Result<ValueMap, SettingsError> {
    if !path.exists() {
        return Ok(ValueMap::new());
    }
    let contents = fs::read_to_string(path)?;

    // Strip comments (lines starting with //) so the file stays hand-editable
    let cleaned: String = contents
        .lines()
        .filter(|line| !line.trim().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n");

    if cleaned.trim().is_empty() {
        return Ok(ValueMap::new());
    }
    serde_json::from_str(&cleaned).map_err(|e| SettingsError::Parse(e.to_string()))
}

/// Write to a temp file, then rename over the target.
fn write_values(path: &Path, values: &ValueMap) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json =
        serde_json::to_string_pretty(values).map_err(|e| SettingsError::Serialize(e.to_string()))?;
    let temp = path.with_extension("json.tmp");
    fs::write(&temp, json)?;
    fs::rename(&temp, path)?;
    Ok(())
}

impl PreferenceBackend for JsonFileBackend {
    fn get_float(&self, key: &str) -> Option<f32> {
        self.values.get(key).map(|v| v.as_f32())
    }

    fn get_int(&self, key: &str) -> Option<i32> {
        self.values.get(key).map(|v| v.as_i32())
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), StoredValue::Float(value));
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.values.insert(key.to_string(), StoredValue::Int(value));
    }

    fn save(&mut self) -> Result<(), SettingsError> {
        write_values(&self.path, &self.values)
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    pending: ValueMap,
    saved: ValueMap,
    saves: usize,
    fail_saves: bool,
}

/// Preferences held in memory.
///
/// Clones share state, so a caller can keep a handle after handing the
/// backend to a store. `reopen` simulates a restart: it only sees what was
/// saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose durable state is `values` (as if written by an earlier session)
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, StoredValue)>,
        K: Into<String>,
    {
        let saved: ValueMap = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let state = MemoryState {
            pending: saved.clone(),
            saved,
            ..MemoryState::default()
        };
        Self { state: Rc::new(RefCell::new(state)) }
    }

    /// A fresh backend over the saved state only
    pub fn reopen(&self) -> Self {
        let saved = self.state.borrow().saved.clone();
        Self::with_values(saved)
    }

    /// How many times `save` succeeded
    pub fn saves(&self) -> usize {
        self.state.borrow().saves
    }

    /// Make every following `save` fail (for exercising error paths)
    pub fn set_fail_saves(&self, fail: bool) {
        self.state.borrow_mut().fail_saves = fail;
    }

    /// Durable value of `key`, if saved
    pub fn saved(&self, key: &str) -> Option<StoredValue> {
        self.state.borrow().saved.get(key).copied()
    }
}

impl PreferenceBackend for MemoryBackend {
    fn get_float(&self, key: &str) -> Option<f32> {
        self.state.borrow().pending.get(key).map(|v| v.as_f32())
    }

    fn get_int(&self, key: &str) -> Option<i32> {
        self.state.borrow().pending.get(key).map(|v| v.as_i32())
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.state.borrow_mut().pending.insert(key.to_string(), StoredValue::Float(value));
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.state.borrow_mut().pending.insert(key.to_string(), StoredValue::Int(value));
    }

    fn save(&mut self) -> Result<(), SettingsError> {
        let mut state = self.state.borrow_mut();
        if state.fail_saves {
            return Err(SettingsError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "saves disabled",
            )));
        }
        state.saved = state.pending.clone();
        state.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::open(temp_dir.path().join("settings.json"));
        assert!(backend.is_empty());
        assert_eq!(backend.get_float("BGMVolume"), None);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.json");

        let mut backend = JsonFileBackend::open(&path);
        backend.set_float("BGMVolume", 0.7);
        backend.set_int("BGMMuted", 1);
        backend.save().unwrap();
        assert!(path.exists(), "save should create parent directories");

        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"BGMVolume\": 0.7"), "{json}");
        assert!(json.contains("\"BGMMuted\": 1"), "{json}");

        let reopened = JsonFileBackend::open(&path);
        assert_eq!(reopened.get_float("BGMVolume"), Some(0.7));
        assert_eq!(reopened.get_int("BGMMuted"), Some(1));
    }

    #[test]
    fn test_unsaved_writes_are_not_durable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");

        let mut backend = JsonFileBackend::open(&path);
        backend.set_int("HapticEnabled", 0);
        assert_eq!(backend.get_int("HapticEnabled"), Some(0));

        let reopened = JsonFileBackend::open(&path);
        assert_eq!(reopened.get_int("HapticEnabled"), None);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let mut backend = JsonFileBackend::open(&path);
        assert!(backend.is_empty());

        // Next save replaces the broken file
        backend.set_int("GraphicsQualityMode", 2);
        backend.save().unwrap();
        assert_eq!(JsonFileBackend::open(&path).get_int("GraphicsQualityMode"), Some(2));
    }

    #[test]
    fn test_comment_lines_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{\n    // audio\n    \"SFXVolume\": 0.25\n}\n").unwrap();

        let backend = JsonFileBackend::open(&path);
        assert_eq!(backend.get_float("SFXVolume"), Some(0.25));
    }

    #[test]
    fn test_numeric_views_cross_convert() {
        let backend = MemoryBackend::with_values([
            ("AsInt", StoredValue::Int(2)),
            ("AsFloat", StoredValue::Float(1.6)),
        ]);
        assert_eq!(backend.get_float("AsInt"), Some(2.0));
        assert_eq!(backend.get_int("AsFloat"), Some(2));
    }

    #[test]
    fn test_memory_reopen_sees_only_saved_state() {
        let mut backend = MemoryBackend::new();
        backend.set_float("BGMVolume", 0.3);
        backend.save().unwrap();
        backend.set_float("BGMVolume", 0.9);

        assert_eq!(backend.get_float("BGMVolume"), Some(0.9));
        assert_eq!(backend.reopen().get_float("BGMVolume"), Some(0.3));
        assert_eq!(backend.saves(), 1);
    }

    #[test]
    fn test_memory_failing_saves() {
        let mut backend = MemoryBackend::new();
        backend.set_fail_saves(true);
        backend.set_int("BGMMuted", 1);

        assert!(matches!(backend.save(), Err(SettingsError::Io(_))));
        assert_eq!(backend.saved("BGMMuted"), None);
        assert_eq!(backend.saves(), 0);
    }
}
