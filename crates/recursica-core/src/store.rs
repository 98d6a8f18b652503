// ABOUTME: Injected key/value store for remembered primary palette levels
// ABOUTME: Read failures and malformed values always count as "no override"

use parking_lot::RwLock;
use recursica_logging::debug;
use recursica_types::ThemeMode;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::error::StoreError;
use crate::levels::canonical_level;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store; optionally seeded from a JSON object on disk
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a JSON object. The file is only read, never written back.
    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        let Value::Object(map) = value else {
            return Err(StoreError::NotAnObject {
                path: path.to_path_buf(),
            });
        };

        let entries = map
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect();
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `palette-primary-level:<palette>:<mode>`
pub fn primary_level_key(palette: &str, mode: ThemeMode) -> String {
    format!("palette-primary-level:{palette}:{mode}")
}

/// The remembered primary level for a palette, if one is stored and valid.
///
/// Stored values may be JSON strings (`"400"`) or bare text (`400`).
pub fn read_primary_level(
    store: &dyn KeyValueStore,
    palette: &str,
    mode: ThemeMode,
) -> Option<&'static str> {
    let key = primary_level_key(palette, mode);
    let raw = match store.get(&key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            debug!(key = %key, error = %err, "Primary level store read failed");
            return None;
        }
    };

    let text = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::String(s)) => s,
        Ok(Value::Number(n)) => n.to_string(),
        _ => raw,
    };

    let level = canonical_level(&text);
    if level.is_none() {
        debug!(key = %key, value = %text, "Ignoring invalid stored primary level");
    }
    level
}
