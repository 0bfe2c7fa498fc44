//! File-backed settings store.
//!
//! One JSON object per install, read fully at startup and rewritten on flush.
//! Concurrent writers are not expected; writes are idempotent. A missing or
//! corrupt file degrades to an empty store with a warning, never an error.

use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Number, Value};

use crate::capabilities::{SettingValue, SettingsStore};

/// Key/value store persisted as a single JSON object on disk.
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
    dirty: bool,
}

impl JsonFileStore {
    /// Opens (or initializes) the store at an explicit path.
    pub fn open(path: PathBuf) -> Self {
        let values = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    log::warn!("settings file {} is not a JSON object, starting fresh", path.display());
                    Map::new()
                }
                Err(err) => {
                    log::warn!("settings file {} unreadable ({err}), starting fresh", path.display());
                    Map::new()
                }
            },
            Err(_) => Map::new(),
        };
        Self {
            path,
            values,
            dirty: false,
        }
    }

    /// Opens the store at the per-user default location
    /// (`<config dir>/trackpal/settings.json`), or `None` if the platform has
    /// no config directory.
    pub fn at_default_location() -> Option<Self> {
        let path = dirs::config_dir()?.join("trackpal").join("settings.json");
        Some(Self::open(path))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn to_json(value: SettingValue) -> Value {
        match value {
            SettingValue::Float(v) => Number::from_f64(v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SettingValue::Int(v) => Value::Number(v.into()),
            SettingValue::Bool(v) => Value::Bool(v),
            SettingValue::Text(v) => Value::String(v),
        }
    }

    fn from_json(value: &Value) -> Option<SettingValue> {
        match value {
            Value::Bool(v) => Some(SettingValue::Bool(*v)),
            Value::String(v) => Some(SettingValue::Text(v.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(SettingValue::Int(i))
                } else {
                    n.as_f64().map(SettingValue::Float)
                }
            }
            _ => None,
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).and_then(Self::from_json)
    }

    fn set(&mut self, key: &str, value: SettingValue) {
        let json = Self::to_json(value);
        if self.values.get(key) != Some(&json) {
            self.values.insert(key.to_owned(), json);
            self.dirty = true;
        }
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.dirty = true;
        }
    }

    fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                log::error!("cannot create settings directory {}: {err}", parent.display());
                return;
            }
        }
        match serde_json::to_string_pretty(&Value::Object(self.values.clone())) {
            Ok(text) => match fs::write(&self.path, text) {
                Ok(()) => self.dirty = false,
                Err(err) => log::error!("cannot write settings file {}: {err}", self.path.display()),
            },
            Err(err) => log::error!("cannot serialize settings: {err}"),
        }
    }
}

impl Drop for JsonFileStore {
    fn drop(&mut self) {
        self.flush();
    }
}
