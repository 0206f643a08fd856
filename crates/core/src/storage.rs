//! Key-value persistence for the game collection.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::models::Game;

/// Key the collection is stored under.
pub const STORAGE_KEY: &str = "gameshelf-games";

/// Directory under the user's data directory used by [`FileKeyValueStore`].
pub const DEFAULT_DATA_DIR: &str = "gameshelf";

/// Failures raised by a [`KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The collection could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The backend refused the operation, e.g. a quota was exceeded.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous string key-value store.
pub trait KeyValueStore {
    /// Read the value under `key`, `None` when absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Write `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Delete `key`; absent keys are not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default location under the user's data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DATA_DIR)
    }

    /// Directory holding the key files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_component(key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(|source| StorageError::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|source| StorageError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

/// Process-local store, handy for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Persistence adapter for the collection.
///
/// Never fails towards the caller: backend errors are logged and turned into
/// an empty collection (load) or a no-op (save, clear). Stored records that
/// cannot be decoded are held back on load and written out again on the next
/// save, so they are never dropped from disk.
#[derive(Debug)]
pub struct GameStorage<S> {
    backend: S,
    key: String,
    unreadable: Mutex<Vec<Value>>,
}

impl<S: KeyValueStore> GameStorage<S> {
    /// Adapter writing under [`STORAGE_KEY`].
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    /// Adapter writing under a custom key.
    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            unreadable: Mutex::new(Vec::new()),
        }
    }

    /// Underlying key-value store.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Key the collection lives under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored records skipped by the last load.
    pub fn unreadable_count(&self) -> usize {
        self.unreadable.lock().len()
    }

    /// Serialise and write the whole collection, followed by any records
    /// the last load could not decode.
    pub fn save(&self, games: &[Game]) {
        let result = self
            .encode(games)
            .and_then(|serialised| self.backend.set_item(&self.key, &serialised));
        match result {
            Ok(()) => debug!(key = %self.key, count = games.len(), "Saved game collection"),
            Err(err) => error!(key = %self.key, %err, "Failed to save game collection"),
        }
    }

    /// Read the collection back, falling back to empty on any problem.
    ///
    /// Records are decoded one by one and kept as stored; business rules are
    /// not re-checked. A record that does not decode is skipped and held.
    pub fn load(&self) -> Vec<Game> {
        let raw = match self.backend.get_item(&self.key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return Vec::new(),
            Err(err) => {
                error!(key = %self.key, %err, "Failed to read game collection");
                return Vec::new();
            }
        };

        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                error!(key = %self.key, %err, "Stored game collection is not valid JSON");
                return Vec::new();
            }
        };
        let Value::Array(records) = parsed else {
            warn!(key = %self.key, "Stored game collection is not an array");
            return Vec::new();
        };

        let mut games = Vec::with_capacity(records.len());
        let mut unreadable = Vec::new();
        for (index, record) in records.into_iter().enumerate() {
            match Game::deserialize(&record) {
                Ok(game) => games.push(game),
                Err(err) => {
                    warn!(key = %self.key, index, %err, "Skipping unreadable game record");
                    unreadable.push(record);
                }
            }
        }
        *self.unreadable.lock() = unreadable;
        games
    }

    /// Remove the stored collection, including held records.
    pub fn clear(&self) {
        self.unreadable.lock().clear();
        if let Err(err) = self.backend.remove_item(&self.key) {
            error!(key = %self.key, %err, "Failed to clear game collection");
        }
    }

    fn encode(&self, games: &[Game]) -> Result<String, StorageError> {
        let held = self.unreadable.lock();
        if held.is_empty() {
            return Ok(serde_json::to_string(games)?);
        }
        let mut records = games
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()?;
        records.extend(held.iter().cloned());
        Ok(serde_json::to_string(&records)?)
    }
}

fn sanitize_component(input: &str) -> String {
    let result: String = input
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
        .collect();
    if result.is_empty() {
        "store".to_string()
    } else {
        result
    }
}
