//! Backend trait abstraction.

use typedkv_core::{CoreError, Entry, Kind};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Empty key on write, or a value the store cannot represent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Value kind outside {string, number, boolean, object}
    #[error("Unsupported value type: {0}")]
    UnsupportedType(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Fault reported by an engine
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<CoreError> for StorageError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedType(kind) => StorageError::UnsupportedType(kind.to_string()),
            CoreError::UnknownKind(_) => StorageError::InvalidArgument(err.to_string()),
        }
    }
}

/// Persistence capability behind an [`Instance`](crate::Instance).
///
/// One backend serves exactly one instance. Typed getters return `None`
/// both when the key is missing and when the stored kind does not match
/// the requested one; `Err` is reserved for engine faults.
pub trait Backend: Send {
    /// Write a typed entry, replacing any previous value under `key`.
    fn set(&mut self, key: &str, entry: Entry) -> Result<()>;

    /// Read a string value.
    fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Read a number value.
    fn get_number(&self, key: &str) -> Result<Option<f64>>;

    /// Read a boolean value.
    fn get_boolean(&self, key: &str) -> Result<Option<bool>>;

    /// Read the raw JSON text of an object value.
    fn get_object_text(&self, key: &str) -> Result<Option<String>>;

    /// Kind of the stored value, as far as the backend can tell.
    fn kind_of(&self, key: &str) -> Result<Option<Kind>>;

    /// Remove `key`. Missing keys are not an error.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Whether `key` holds a value of any kind.
    fn contains(&self, key: &str) -> Result<bool>;

    /// All keys currently stored.
    fn all_keys(&self) -> Result<Vec<String>>;

    /// Remove every key.
    fn clear(&mut self) -> Result<()>;
}
