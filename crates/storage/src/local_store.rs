//! Browser-style local storage: a synchronous, string-item store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::file_engine::{file_stem, write_atomic};
use crate::Result;

/// A synchronous store of named string items.
///
/// Mirrors the `getItem` / `setItem` / `removeItem` surface of a browser's
/// local storage. It is shared by every instance of a registry; each
/// instance addresses a single item.
pub trait LocalStore: Send {
    /// Read an item.
    fn get_item(&self, name: &str) -> Result<Option<String>>;

    /// Write an item.
    fn set_item(&mut self, name: &str, value: &str) -> Result<()>;

    /// Remove an item. Missing items are not an error.
    fn remove_item(&mut self, name: &str) -> Result<()>;
}

/// In-memory local storage.
///
/// Clones share the same items, the way every script on a page sees the
/// same `localStorage`.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocalStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryLocalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStore for MemoryLocalStore {
    fn get_item(&self, name: &str) -> Result<Option<String>> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(name).cloned())
    }

    fn set_item(&mut self, name: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, name: &str) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(name);
        Ok(())
    }
}

/// Durable local storage: one file per item.
#[derive(Debug, Clone)]
pub struct FileLocalStore {
    dir: PathBuf,
}

impl FileLocalStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn item_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.item", file_stem(name)))
    }
}

impl LocalStore for FileLocalStore {
    fn get_item(&self, name: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.item_path(name)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, name: &str, value: &str) -> Result<()> {
        write_atomic(&self.item_path(name), value.as_bytes())
    }

    fn remove_item(&mut self, name: &str) -> Result<()> {
        std::fs::remove_file(self.item_path(name)).or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
        })?;
        Ok(())
    }
}
