//! Key-value persistence port and adapters.
//!
//! The stores persist their document slice after every commit under a
//! store-specific key. The port mirrors the browser local-storage shape:
//! string keys to string values, fire-and-forget writes.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Storage abstraction the stores write through.
pub trait StoragePort: Send + Sync {
    /// Save a string value with the given key
    fn save(&self, key: &str, value: &str);

    /// Load a string value by key, returns None if not found
    fn load(&self, key: &str) -> Option<String>;

    /// Remove a value by key
    fn remove(&self, key: &str);
}

/// Metadata envelope wrapped around each persisted document slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistEnvelope<T> {
    pub state: T,
    pub version: u32,
}

/// Current envelope layout version
pub const ENVELOPE_VERSION: u32 = 0;

impl<T> PersistEnvelope<T> {
    pub fn new(state: T) -> Self {
        Self {
            state,
            version: ENVELOPE_VERSION,
        }
    }
}

/// In-memory storage, used by tests and as a scratch backend.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for MemoryStorage {
    fn save(&self, key: &str, value: &str) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.to_string());
    }

    fn load(&self, key: &str) -> Option<String> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(key).cloned()
    }

    fn remove(&self, key: &str) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(key);
    }
}

/// File-backed storage.
///
/// Stores key-value pairs in a single JSON file under the platform config
/// directory (e.g. `~/.config/mistbound/storage.json` on Linux), with an
/// in-memory cache in front of the file.
pub struct FileStorage {
    storage_path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStorage {
    pub fn new() -> Self {
        let storage_path = match directories::ProjectDirs::from("io", "mistbound", "sheet") {
            Some(dirs) => dirs.config_dir().join("storage.json"),
            None => PathBuf::from("mistbound_storage.json"),
        };
        Self::at_path(storage_path)
    }

    /// Open storage at an explicit file path
    pub fn at_path(storage_path: PathBuf) -> Self {
        let cache = if storage_path.exists() {
            match fs::read_to_string(&storage_path) {
                Ok(data) => match serde_json::from_str::<HashMap<String, String>>(&data) {
                    Ok(map) => map,
                    Err(error) => {
                        tracing::warn!(%error, "failed to parse storage file");
                        HashMap::new()
                    }
                },
                Err(error) => {
                    tracing::warn!(%error, "failed to read storage file");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        tracing::debug!(path = %storage_path.display(), "file storage initialized");

        Self {
            storage_path,
            cache: RwLock::new(cache),
        }
    }

    fn persist(&self) {
        if let Some(parent) = self.storage_path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                tracing::error!(%error, "failed to create storage directory");
                return;
            }
        }
        let snapshot = {
            let cache = self
                .cache
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            cache.clone()
        };
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => {
                if let Err(error) = fs::write(&self.storage_path, json) {
                    tracing::error!(%error, "failed to write storage file");
                }
            }
            Err(error) => tracing::error!(%error, "failed to serialize storage"),
        }
    }
}

impl StoragePort for FileStorage {
    fn save(&self, key: &str, value: &str) {
        {
            let mut cache = self
                .cache
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            cache.insert(key.to_string(), value.to_string());
        }
        self.persist();
    }

    fn load(&self, key: &str) -> Option<String> {
        let cache = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.get(key).cloned()
    }

    fn remove(&self, key: &str) {
        {
            let mut cache = self
                .cache
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            cache.remove(key);
        }
        self.persist();
    }
}
