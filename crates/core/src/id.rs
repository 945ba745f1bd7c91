//! Identifiers for storage instances.

use serde::{Deserialize, Serialize};

/// Identifier of an isolated key-value namespace.
///
/// Ids are not validated; any string names an instance. The reserved
/// id [`InstanceId::DEFAULT`] addresses the default instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Reserved id of the default instance.
    pub const DEFAULT: &'static str = "default";

    /// Create an id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The default instance id.
    pub fn default_id() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// Whether this is the default instance.
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::default_id()
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for InstanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
