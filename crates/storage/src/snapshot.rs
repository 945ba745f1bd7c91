//! Snapshot backend: the local-storage fallback.
//!
//! Keeps the instance's entries in memory as tagged pairs and, after every
//! mutation, writes the *whole* instance as one JSON object into a single
//! local-storage item (`typedkv_instance_<id>`):
//!
//! ```text
//! {"name": {"type": "string", "value": "John"},
//!  "user": {"type": "object", "value": "{\"id\":1}"}}
//! ```
//!
//! The item is read once, when the backend is built.
//!
//! Accepted limitations of this strategy:
//! - every mutation re-serializes the whole instance, so it costs
//!   O(size of instance) rather than O(1);
//! - two backends over the same item (two execution contexts sharing one
//!   local storage) are not coordinated: each saves its own view, the last
//!   save wins and the other's intervening writes are lost.
//!
//! Load and save failures are logged and downgraded (empty instance, no-op);
//! they never reach the caller.

use std::collections::BTreeMap;

use serde_json::Value as Json;
use tracing::{debug, warn};
use typedkv_core::{Entry, InstanceId, Kind};

use crate::{Backend, LocalStore, Result};

/// Prefix of the local-storage item holding an instance snapshot.
pub const INSTANCE_PREFIX: &str = "typedkv_instance_";

/// Backend persisting whole-instance snapshots into a [`LocalStore`].
pub struct SnapshotBackend {
    item: String,
    store: Box<dyn LocalStore>,
    data: BTreeMap<String, Entry>,
}

impl SnapshotBackend {
    /// Build the backend for `id`, restoring any snapshot already in `store`.
    pub fn open(id: &InstanceId, store: impl LocalStore + 'static) -> Self {
        let item = Self::item_name(id);
        let data = load_snapshot(&store, &item);
        debug!("Loaded snapshot {} with {} entries", item, data.len());
        Self {
            item,
            store: Box::new(store),
            data,
        }
    }

    /// Name of the local-storage item holding the snapshot of `id`.
    pub fn item_name(id: &InstanceId) -> String {
        format!("{}{}", INSTANCE_PREFIX, id)
    }

    fn save(&mut self) {
        let serialized = match serde_json::to_string(&self.data) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize snapshot {}: {}", self.item, e);
                return;
            }
        };
        if let Err(e) = self.store.set_item(&self.item, &serialized) {
            warn!("Failed to save snapshot {}: {}", self.item, e);
        }
    }
}

/// Restore a snapshot. Unreadable snapshots load as empty; unreadable
/// entries are skipped without affecting their neighbours.
fn load_snapshot(store: &dyn LocalStore, item: &str) -> BTreeMap<String, Entry> {
    let mut data = BTreeMap::new();

    let raw = match store.get_item(item) {
        Ok(Some(raw)) => raw,
        Ok(None) => return data,
        Err(e) => {
            warn!("Failed to load snapshot {}: {}", item, e);
            return data;
        }
    };

    let parsed: serde_json::Map<String, Json> = match serde_json::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Failed to parse snapshot {}: {}", item, e);
            return data;
        }
    };

    for (key, value) in parsed {
        match serde_json::from_value::<Entry>(value) {
            Ok(entry) => {
                data.insert(key, entry);
            }
            Err(e) => warn!("Skipping unreadable entry {} in {}: {}", key, item, e),
        }
    }
    data
}

impl Backend for SnapshotBackend {
    fn set(&mut self, key: &str, entry: Entry) -> Result<()> {
        self.data.insert(key.to_string(), entry);
        self.save();
        Ok(())
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.data.get(key) {
            Some(Entry::String(s)) => Ok(Some(s.clone())),
            _ => Ok(None),
        }
    }

    fn get_number(&self, key: &str) -> Result<Option<f64>> {
        match self.data.get(key) {
            Some(Entry::Number(n)) => Ok(Some(*n)),
            _ => Ok(None),
        }
    }

    fn get_boolean(&self, key: &str) -> Result<Option<bool>> {
        match self.data.get(key) {
            Some(Entry::Boolean(b)) => Ok(Some(*b)),
            _ => Ok(None),
        }
    }

    fn get_object_text(&self, key: &str) -> Result<Option<String>> {
        match self.data.get(key) {
            Some(Entry::Object(text)) => Ok(Some(text.clone())),
            _ => Ok(None),
        }
    }

    fn kind_of(&self, key: &str) -> Result<Option<Kind>> {
        Ok(self.data.get(key).map(Entry::kind))
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.data.remove(key);
        self.save();
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.data.contains_key(key))
    }

    fn all_keys(&self) -> Result<Vec<String>> {
        Ok(self.data.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<()> {
        self.data.clear();
        self.save();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryLocalStore, StorageError};
    use serde_json::json;

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    impl LocalStore for ReadOnlyStore {
        fn get_item(&self, _name: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set_item(&mut self, _name: &str, _value: &str) -> Result<()> {
            Err(StorageError::Backend("quota exceeded".to_string()))
        }

        fn remove_item(&mut self, _name: &str) -> Result<()> {
            Ok(())
        }
    }

    fn snapshot_json(store: &MemoryLocalStore, id: &str) -> Json {
        let raw = store
            .get_item(&SnapshotBackend::item_name(&InstanceId::new(id)))
            .unwrap()
            .unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_every_mutation_writes_whole_snapshot() {
        let store = MemoryLocalStore::new();
        let mut backend = SnapshotBackend::open(&InstanceId::default(), store.clone());

        backend.set("name", Entry::String("John".into())).unwrap();
        backend.set("user", Entry::Object(r#"{"id":1}"#.into())).unwrap();
        assert_eq!(
            snapshot_json(&store, "default"),
            json!({
                "name": {"type": "string", "value": "John"},
                "user": {"type": "object", "value": "{\"id\":1}"}
            })
        );

        backend.delete("name").unwrap();
        assert_eq!(
            snapshot_json(&store, "default"),
            json!({"user": {"type": "object", "value": "{\"id\":1}"}})
        );

        backend.clear().unwrap();
        assert_eq!(snapshot_json(&store, "default"), json!({}));
    }

    #[test]
    fn test_kind_tag_is_enforced() {
        let mut backend = SnapshotBackend::open(&InstanceId::default(), MemoryLocalStore::new());
        backend.set("user", Entry::Object(r#"{"id":1}"#.into())).unwrap();
        backend.set("age", Entry::Number(25.0)).unwrap();

        assert_eq!(backend.get_string("user").unwrap(), None);
        assert_eq!(backend.get_string("age").unwrap(), None);
        assert_eq!(backend.get_object_text("age").unwrap(), None);
        assert_eq!(backend.kind_of("user").unwrap(), Some(Kind::Object));
    }

    #[test]
    fn test_restores_existing_snapshot() {
        let store = MemoryLocalStore::new();
        {
            let mut backend = SnapshotBackend::open(&InstanceId::new("cache"), store.clone());
            backend.set("hits", Entry::Number(3.0)).unwrap();
        }
        let backend = SnapshotBackend::open(&InstanceId::new("cache"), store);
        assert_eq!(backend.get_number("hits").unwrap(), Some(3.0));
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty() {
        let mut store = MemoryLocalStore::new();
        store.set_item("typedkv_instance_default", "{not json").unwrap();

        let backend = SnapshotBackend::open(&InstanceId::default(), store);
        assert!(backend.all_keys().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_entry_does_not_affect_others() {
        let mut store = MemoryLocalStore::new();
        store
            .set_item(
                "typedkv_instance_default",
                r#"{"ok": {"type": "boolean", "value": true},
                    "bad": {"type": "number", "value": "nope"}}"#,
            )
            .unwrap();

        let backend = SnapshotBackend::open(&InstanceId::default(), store);
        assert_eq!(backend.get_boolean("ok").unwrap(), Some(true));
        assert!(!backend.contains("bad").unwrap());
    }

    #[test]
    fn test_save_failure_is_not_propagated() {
        let mut backend = SnapshotBackend::open(&InstanceId::default(), ReadOnlyStore);
        backend.set("k", Entry::String("v".into())).unwrap();
        // The in-memory view still reflects the write
        assert_eq!(backend.get_string("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_concurrent_handles_lose_updates() {
        let store = MemoryLocalStore::new();
        let id = InstanceId::default();
        let mut first = SnapshotBackend::open(&id, store.clone());
        let mut second = SnapshotBackend::open(&id, store.clone());

        first.set("a", Entry::String("1".into())).unwrap();
        second.set("b", Entry::String("2".into())).unwrap();

        // Last save wins: the write through `first` is gone
        let reloaded = SnapshotBackend::open(&id, store);
        assert_eq!(reloaded.all_keys().unwrap(), vec!["b".to_string()]);
    }
}
