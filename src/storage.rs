//! Durable key/value storage for the active document.
//!
//! Each document field group lives under its own fixed key as a JSON string. Writes are
//! best effort: failures are logged and never surfaced to the caller. Reads that fail
//! to parse fall back to a hard-coded default.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// Key holding the tag list.
pub const TAGS_KEY: &str = "thumbnail.tags";
/// Key holding the palette selection.
pub const PALETTE_KEY: &str = "thumbnail.palette";
/// Key holding the canvas size preset.
pub const CANVAS_SIZE_KEY: &str = "thumbnail.canvas-size";
/// Key holding the tag size preset.
pub const TAG_SIZE_KEY: &str = "thumbnail.tag-size";
/// Key holding the layout mode.
pub const LAYOUT_MODE_KEY: &str = "thumbnail.layout-mode";

/// Failure of a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached (e.g. no `localStorage` in this browser)
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    /// Reading or writing failed
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A string key/value store.
pub trait KeyValueStore {
    /// Returns the stored value, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes the value under `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage handle shared between the tag store and the document state.
pub type SharedStorage = Rc<dyn KeyValueStore>;

/// Reads and parses `key`, falling back to `default` when missing or malformed.
pub fn load_or<T: DeserializeOwned>(storage: &dyn KeyValueStore, key: &str, default: T) -> T {
    match storage.get(key) {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Ignoring malformed value under {key}: {err}");
                default
            }
        },
        None => default,
    }
}

/// Serializes `value` and writes it under `key`. Failures are logged only.
pub fn save_json<T: Serialize + ?Sized>(storage: &dyn KeyValueStore, key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(err) => {
            log::error!("Failed to serialize value for {key}: {err}");
            return;
        }
    };
    if let Err(err) = storage.set(key, &json) {
        log::warn!("Failed to persist {key}: {err}");
    }
}

/// In-process store, used by tests and as a last-resort backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store wrapped for sharing.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser-local durable storage.
///
/// On the web this is `window.localStorage`. On native targets every key is a file in
/// the application's storage directory.
pub struct LocalStore {
    #[cfg(not(target_arch = "wasm32"))]
    dir: std::path::PathBuf,
}

impl LocalStore {
    /// Opens the store for the given application id.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open(app_id: &str) -> Result<Self, StorageError> {
        let dir = eframe::storage_dir(app_id)
            .ok_or_else(|| StorageError::Unavailable("no storage directory".into()))?
            .join("document");
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Opens a store rooted at an explicit directory.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn in_dir(dir: impl Into<std::path::PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Opens the store for the given application id.
    #[cfg(target_arch = "wasm32")]
    pub fn open(_app_id: &str) -> Result<Self, StorageError> {
        Self::local_storage()?;
        Ok(Self {})
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    #[cfg(target_arch = "wasm32")]
    fn local_storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".into()))?
            .local_storage()
            .map_err(|_| StorageError::Unavailable("localStorage access denied".into()))?
            .ok_or_else(|| StorageError::Unavailable("localStorage missing".into()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::local_storage().ok()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::local_storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::Unavailable(format!("could not write {key}")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::local_storage()?
            .remove_item(key)
            .map_err(|_| StorageError::Unavailable(format!("could not remove {key}")))
    }
}

/// Opens the platform's local store, falling back to memory when it is unavailable.
pub fn open_default(app_id: &str) -> SharedStorage {
    match LocalStore::open(app_id) {
        Ok(store) => Rc::new(store),
        Err(err) => {
            log::warn!("Local storage unavailable, document will not survive restarts: {err}");
            MemoryStore::shared()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteName;

    #[test]
    fn load_or_falls_back_on_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(load_or(&store, PALETTE_KEY, PaletteName::Cream), PaletteName::Cream);
    }

    #[test]
    fn load_or_falls_back_on_malformed_value() {
        let store = MemoryStore::new();
        store.set(PALETTE_KEY, "{not json").unwrap();
        assert_eq!(load_or(&store, PALETTE_KEY, PaletteName::White), PaletteName::White);

        store.set(PALETTE_KEY, "\"no_such_palette\"").unwrap();
        assert_eq!(load_or(&store, PALETTE_KEY, PaletteName::White), PaletteName::White);
    }

    #[test]
    fn save_then_load() {
        let store = MemoryStore::new();
        save_json(&store, PALETTE_KEY, &PaletteName::MintGradient);
        assert_eq!(store.get(PALETTE_KEY).as_deref(), Some("\"mint_gradient\""));
        assert_eq!(load_or(&store, PALETTE_KEY, PaletteName::White), PaletteName::MintGradient);
    }

    #[test]
    fn remove_clears_value() {
        let store = MemoryStore::new();
        store.set(TAGS_KEY, "[]").unwrap();
        store.remove(TAGS_KEY).unwrap();
        store.remove(TAGS_KEY).unwrap();
        assert!(store.get(TAGS_KEY).is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn local_store_writes_one_file_per_key() {
        let dir = std::env::temp_dir().join(format!("thumbnail-editor-test-{}", uuid::Uuid::new_v4()));
        let store = LocalStore::in_dir(&dir).unwrap();
        store.set(TAG_SIZE_KEY, "\"large\"").unwrap();
        assert!(dir.join("thumbnail.tag-size.json").exists());
        assert_eq!(store.get(TAG_SIZE_KEY).as_deref(), Some("\"large\""));
        store.remove(TAG_SIZE_KEY).unwrap();
        assert!(store.get(TAG_SIZE_KEY).is_none());
        let _ = std::fs::remove_dir_all(dir);
    }
}
