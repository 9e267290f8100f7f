//! View persistence: storage contract and the saved-view codec
//!
//! Everything the engine persists (selection, viewable bounds, mode, heading)
//! travels as one JSON document under a single key. Tilt is deliberately not
//! stored; it is a function of selection presence and is recomputed on load.
//! Read failures never break startup: a malformed document is logged and
//! dropped, and the engine falls back to defaults.

use crate::engine::NavMode;
use crate::geometry::GeoBounds;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key for the persisted view document
pub const VIEW_STORAGE_KEY: &str = "field_map_view";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage IO error: {0}")]
    Io(String),

    #[error("storage JSON error: {0}")]
    Json(String),

    #[error("platform storage error: {0}")]
    Platform(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Synchronous string-keyed persistence. One production adapter per platform
/// plus [`MemoryStore`] for tests and fallback.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// No-op when the key does not exist
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// The saved view state. Unknown fields are ignored on read so older and newer
/// documents stay loadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedView {
    pub selected_area: Option<GeoBounds>,
    pub viewable_bounds: Option<GeoBounds>,
    pub mode: NavMode,
    pub heading: f64,
}

impl Default for PersistedView {
    fn default() -> Self {
        Self {
            selected_area: None,
            viewable_bounds: None,
            mode: NavMode::Global,
            heading: 0.0,
        }
    }
}

/// Load the saved view, falling back to `None` on any read or parse failure.
/// Failures are logged and swallowed: persistence must never take the view
/// down with it.
pub fn load_view(store: &dyn KeyValueStore) -> Option<PersistedView> {
    let json = match store.get(VIEW_STORAGE_KEY) {
        Ok(Some(json)) if !json.is_empty() => json,
        Ok(_) => return None,
        Err(err) => {
            tracing::warn!("Failed to read persisted view: {err}");
            return None;
        }
    };
    match serde_json::from_str::<PersistedView>(&json) {
        Ok(view) => Some(view),
        Err(err) => {
            tracing::warn!("Discarding malformed persisted view: {err}");
            None
        }
    }
}

/// Best-effort save; write failures are logged and otherwise ignored
pub fn save_view(store: &mut dyn KeyValueStore, view: &PersistedView) {
    match serde_json::to_string(view) {
        Ok(json) => {
            if let Err(err) = store.set(VIEW_STORAGE_KEY, &json) {
                tracing::warn!("Failed to persist view: {err}");
            }
        }
        Err(err) => tracing::warn!("Failed to serialize view: {err}"),
    }
}

/// Remove the saved view (reset-bounds path)
pub fn clear_view(store: &mut dyn KeyValueStore) {
    if let Err(err) = store.remove(VIEW_STORAGE_KEY) {
        tracing::warn!("Failed to clear persisted view: {err}");
    }
}

/// In-memory store for tests and as a fallback when no platform store exists
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::collections::HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_view() -> PersistedView {
        let selected = GeoBounds::new(10.0, 0.0, 10.0, 0.0);
        PersistedView {
            selected_area: Some(selected),
            viewable_bounds: Some(crate::geometry::viewable_bounds(selected)),
            mode: NavMode::Map,
            heading: 90.0,
        }
    }

    #[test]
    fn test_view_round_trip() {
        let mut store = MemoryStore::new();
        let view = sample_view();
        save_view(&mut store, &view);

        assert_eq!(load_view(&store), Some(view));
    }

    #[test]
    fn test_missing_key_loads_as_none() {
        let store = MemoryStore::new();
        assert_eq!(load_view(&store), None);
    }

    #[test]
    fn test_malformed_document_is_dropped() {
        let mut store = MemoryStore::new();
        store.set(VIEW_STORAGE_KEY, "{not json").unwrap();
        assert_eq!(load_view(&store), None);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let mut store = MemoryStore::new();
        let json = serde_json::json!({
            "selected_area": { "north": 10.0, "south": 0.0, "east": 10.0, "west": 0.0 },
            "viewable_bounds": null,
            "mode": "Map",
            "heading": 45.0,
            "tilt": 45.0,
            "future_field": true
        })
        .to_string();
        store.set(VIEW_STORAGE_KEY, &json).unwrap();

        let view = load_view(&store).unwrap();
        assert_eq!(view.mode, NavMode::Map);
        assert_eq!(view.heading, 45.0);
        assert!(view.viewable_bounds.is_none());
    }

    #[test]
    fn test_clear_removes_the_key() {
        let mut store = MemoryStore::new();
        save_view(&mut store, &sample_view());
        assert!(store.contains(VIEW_STORAGE_KEY));

        clear_view(&mut store);
        assert!(!store.contains(VIEW_STORAGE_KEY));
        assert_eq!(load_view(&store), None);
    }

    #[test]
    fn test_mode_serializes_as_plain_names() {
        let json = serde_json::to_string(&sample_view()).unwrap();
        assert!(json.contains("\"mode\":\"Map\""));
    }
}
