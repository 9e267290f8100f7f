//! KeyValueStore adapters for the two persistence backends
//!
//! - [`FileStore`]: one JSON file holding a map of string keys to string
//!   values, flushed synchronously on every mutation. Selected with
//!   `--state-file`; handy for headless runs and tests.
//! - [`EframeStore`]: an in-memory mirror seeded from eframe's app storage at
//!   construction and written back through it in `App::save`. eframe storage
//!   has no remove operation, so removed keys are written as empty strings
//!   and empty strings read back as missing.

use field_nav_core::{KeyValueStore, MemoryStore, StoreError, StoreResult, VIEW_STORAGE_KEY};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub struct FileStore {
    path: PathBuf,
    map: HashMap<String, String>,
}

impl FileStore {
    pub fn open(path: PathBuf) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("failed to create {parent:?}: {e}")))?;
        }

        let mut map = HashMap::new();
        if path.exists() {
            let text = fs::read_to_string(&path)
                .map_err(|e| StoreError::Io(format!("failed to read {path:?}: {e}")))?;
            if !text.trim().is_empty() {
                map = serde_json::from_str(&text)
                    .map_err(|e| StoreError::Json(format!("failed to parse {path:?}: {e}")))?;
            }
        }

        Ok(Self { path, map })
    }

    fn flush(&self) -> StoreResult<()> {
        let text =
            serde_json::to_string_pretty(&self.map).map_err(|e| StoreError::Json(e.to_string()))?;
        fs::write(&self.path, text)
            .map_err(|e| StoreError::Io(format!("failed to write {:?}: {e}", self.path)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.map.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.map.remove(key);
        self.flush()
    }
}

pub struct EframeStore {
    mirror: MemoryStore,
}

impl EframeStore {
    pub fn from_creation(storage: Option<&dyn eframe::Storage>) -> Self {
        let mut mirror = MemoryStore::new();
        if let Some(storage) = storage {
            if let Some(json) = storage.get_string(VIEW_STORAGE_KEY) {
                if !json.is_empty() {
                    let _ = mirror.set(VIEW_STORAGE_KEY, &json);
                }
            }
        }
        Self { mirror }
    }

    /// Write the mirror back through eframe's storage (called from App::save)
    pub fn write_through(&self, storage: &mut dyn eframe::Storage) {
        match self.mirror.get(VIEW_STORAGE_KEY) {
            Ok(Some(json)) => storage.set_string(VIEW_STORAGE_KEY, json),
            _ => storage.set_string(VIEW_STORAGE_KEY, String::new()),
        }
    }
}

impl KeyValueStore for EframeStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.mirror.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.mirror.set(key, value)
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.mirror.remove(key)
    }
}

/// The backend the app actually holds, chosen at startup
pub enum ViewStore {
    File(FileStore),
    Eframe(EframeStore),
}

impl ViewStore {
    pub fn reader(&self) -> &dyn KeyValueStore {
        match self {
            Self::File(store) => store,
            Self::Eframe(store) => store,
        }
    }

    pub fn writer(&mut self) -> &mut dyn KeyValueStore {
        match self {
            Self::File(store) => store,
            Self::Eframe(store) => store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "field-navigator-test-{}-{tag}.json",
            std::process::id()
        ))
    }

    #[test]
    fn test_file_store_roundtrip_and_reload() {
        let path = temp_store_path("roundtrip");
        let _ = fs::remove_file(&path);

        {
            let mut store = FileStore::open(path.clone()).unwrap();
            store.set("k", "v").unwrap();
            assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        }

        // A fresh handle sees the flushed value
        let mut store = FileStore::open(path.clone()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_rejects_malformed_file() {
        let path = temp_store_path("malformed");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileStore::open(path.clone()),
            Err(StoreError::Json(_))
        ));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_eframe_store_starts_empty_without_backing() {
        let store = EframeStore::from_creation(None);
        assert_eq!(store.get(VIEW_STORAGE_KEY).unwrap(), None);
    }
}
