//! Native backend: delegates to a platform key-value engine.
//!
//! The engine stores raw JSON primitives and keeps no kind information of
//! its own. Numbers, booleans and strings are told apart by the shape of the
//! stored primitive. Objects are written as their JSON text, so at rest an
//! object is indistinguishable from a plain string:
//!
//! - `get_string` on an object key returns the JSON text.
//! - `get_object` on a plain string key attempts to decode it.
//!
//! Every other cross-kind read fails closed and yields `None`.

use std::collections::HashMap;

use serde_json::Value as Json;
use typedkv_core::{Entry, Kind};

use crate::{Backend, Result, StorageError};

/// A persistent key-value engine provided by the platform.
///
/// One engine holds the data of one instance.
pub trait NativeEngine: Send {
    /// Store a raw JSON primitive.
    fn set_raw(&mut self, key: &str, value: Json) -> Result<()>;

    /// Read a raw JSON primitive.
    fn get_raw(&self, key: &str) -> Result<Option<Json>>;

    /// Remove a key.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Whether a key exists.
    fn contains(&self, key: &str) -> Result<bool>;

    /// All stored keys.
    fn all_keys(&self) -> Result<Vec<String>>;

    /// Remove every key.
    fn clear_all(&mut self) -> Result<()>;
}

/// Volatile engine. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    data: HashMap<String, Json>,
}

impl MemoryEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NativeEngine for MemoryEngine {
    fn set_raw(&mut self, key: &str, value: Json) -> Result<()> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    fn get_raw(&self, key: &str) -> Result<Option<Json>> {
        Ok(self.data.get(key).cloned())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.data.contains_key(key))
    }

    fn all_keys(&self) -> Result<Vec<String>> {
        Ok(self.data.keys().cloned().collect())
    }

    fn clear_all(&mut self) -> Result<()> {
        self.data.clear();
        Ok(())
    }
}

/// Backend that forwards every call to a [`NativeEngine`].
pub struct NativeBackend {
    engine: Box<dyn NativeEngine>,
}

impl NativeBackend {
    /// Wrap an engine.
    pub fn new(engine: impl NativeEngine + 'static) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    /// Backend over a fresh [`MemoryEngine`].
    pub fn in_memory() -> Self {
        Self::new(MemoryEngine::new())
    }
}

impl Backend for NativeBackend {
    fn set(&mut self, key: &str, entry: Entry) -> Result<()> {
        let raw = match entry {
            Entry::String(s) | Entry::Object(s) => Json::String(s),
            Entry::Number(n) => serde_json::Number::from_f64(n)
                .map(Json::Number)
                .ok_or_else(|| StorageError::InvalidArgument(format!("non-finite number: {}", n)))?,
            Entry::Boolean(b) => Json::Bool(b),
        };
        self.engine.set_raw(key, raw)
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.engine.get_raw(key)? {
            Some(Json::String(s)) => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    fn get_number(&self, key: &str) -> Result<Option<f64>> {
        Ok(self.engine.get_raw(key)?.as_ref().and_then(Json::as_f64))
    }

    fn get_boolean(&self, key: &str) -> Result<Option<bool>> {
        Ok(self.engine.get_raw(key)?.as_ref().and_then(Json::as_bool))
    }

    fn get_object_text(&self, key: &str) -> Result<Option<String>> {
        self.get_string(key)
    }

    fn kind_of(&self, key: &str) -> Result<Option<Kind>> {
        Ok(match self.engine.get_raw(key)? {
            Some(Json::String(_)) => Some(Kind::String),
            Some(Json::Number(_)) => Some(Kind::Number),
            Some(Json::Bool(_)) => Some(Kind::Boolean),
            _ => None,
        })
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.engine.delete(key)
    }

    fn contains(&self, key: &str) -> Result<bool> {
        self.engine.contains(key)
    }

    fn all_keys(&self) -> Result<Vec<String>> {
        self.engine.all_keys()
    }

    fn clear(&mut self) -> Result<()> {
        self.engine.clear_all()
    }
}
