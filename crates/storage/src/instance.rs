//! Typed storage façade over one backend.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use typedkv_core::{Entry, InstanceId, Kind, Value};

use crate::{Backend, Result, StorageError};

/// Typed key-value access to one isolated instance.
///
/// Writes validate the key and report success as `Ok(true)`. Reads return
/// `Ok(None)` for missing keys, for values of another kind and for objects
/// that fail to decode; only backend faults surface as `Err`.
///
/// The façade is `Send + Sync`: every operation takes the backend lock for
/// the duration of a single call.
pub struct Instance {
    id: InstanceId,
    backend: Mutex<Box<dyn Backend>>,
}

impl Instance {
    /// Bind a façade to a backend. The backend never changes afterwards.
    pub fn new(id: InstanceId, backend: impl Backend + 'static) -> Self {
        Self::from_boxed(id, Box::new(backend))
    }

    /// Bind a façade to an already boxed backend.
    pub fn from_boxed(id: InstanceId, backend: Box<dyn Backend>) -> Self {
        Self {
            id,
            backend: Mutex::new(backend),
        }
    }

    /// Id of this instance.
    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    fn backend(&self) -> MutexGuard<'_, Box<dyn Backend>> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, key: &str, entry: Entry) -> Result<bool> {
        validate_key(key)?;
        self.backend().set(key, entry)?;
        Ok(true)
    }

    // === Typed setters ===

    /// Store a string.
    pub fn set_string(&self, key: &str, value: &str) -> Result<bool> {
        self.write(key, Entry::String(value.to_string()))
    }

    /// Store a number. Non-finite numbers are rejected.
    pub fn set_number(&self, key: &str, value: f64) -> Result<bool> {
        if !value.is_finite() {
            return Err(StorageError::InvalidArgument(format!(
                "Number must be finite, got {}",
                value
            )));
        }
        self.write(key, Entry::Number(value))
    }

    /// Store a boolean.
    pub fn set_boolean(&self, key: &str, value: bool) -> Result<bool> {
        self.write(key, Entry::Boolean(value))
    }

    /// Store any serializable value as its JSON text.
    pub fn set_object<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<bool> {
        validate_key(key)?;
        let json = serde_json::to_string(value)?;
        self.backend().set(key, Entry::Object(json))?;
        Ok(true)
    }

    /// Store a JSON value through the setter matching its runtime kind.
    ///
    /// Arrays are stored as objects; `null` is rejected.
    pub fn set(&self, key: &str, value: &serde_json::Value) -> Result<bool> {
        let value = Value::from_json(value.clone())?;
        self.set_value(key, value)
    }

    /// Store a [`Value`] through the setter matching its kind.
    pub fn set_value(&self, key: &str, value: Value) -> Result<bool> {
        match value {
            Value::String(s) => self.set_string(key, &s),
            Value::Number(n) => self.set_number(key, n),
            Value::Boolean(b) => self.set_boolean(key, b),
            Value::Object(v) => self.set_object(key, &v),
        }
    }

    // === Typed getters ===

    /// Read a string.
    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.backend().get_string(key)
    }

    /// Read a number.
    pub fn get_number(&self, key: &str) -> Result<Option<f64>> {
        self.backend().get_number(key)
    }

    /// Read a boolean.
    pub fn get_boolean(&self, key: &str) -> Result<Option<bool>> {
        self.backend().get_boolean(key)
    }

    /// Read and decode an object. Decode failures are logged and read as `None`.
    pub fn get_object<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(text) = self.backend().get_object_text(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Failed to parse stored object {} in {}: {}", key, self.id, e);
                Ok(None)
            }
        }
    }

    /// Read a value of the given kind (string when omitted).
    pub fn get(&self, key: &str, kind: Option<Kind>) -> Result<Option<Value>> {
        Ok(match kind.unwrap_or_default() {
            Kind::String => self.get_string(key)?.map(Value::String),
            Kind::Number => self.get_number(key)?.map(Value::Number),
            Kind::Boolean => self.get_boolean(key)?.map(Value::Boolean),
            Kind::Object => self.get_object::<serde_json::Value>(key)?.map(Value::Object),
        })
    }

    /// Kind of the value under `key`, as recorded by the backend.
    pub fn kind_of(&self, key: &str) -> Result<Option<Kind>> {
        self.backend().kind_of(key)
    }

    // === Key space ===

    /// Remove `key`. Succeeds whether or not the key existed.
    pub fn delete(&self, key: &str) -> Result<bool> {
        self.backend().delete(key)?;
        Ok(true)
    }

    /// Whether `key` holds a value of any kind.
    pub fn contains(&self, key: &str) -> Result<bool> {
        self.backend().contains(key)
    }

    /// All keys in this instance, in no particular order.
    pub fn all_keys(&self) -> Result<Vec<String>> {
        self.backend().all_keys()
    }

    /// Remove every key. The instance stays usable.
    pub fn clear(&self) -> Result<bool> {
        self.backend().clear()?;
        Ok(true)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance").field("id", &self.id).finish_non_exhaustive()
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidArgument(
            "Key cannot be empty".to_string(),
        ));
    }
    Ok(())
}
