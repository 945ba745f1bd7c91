//! Storage configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Result, StorageError};

/// Environment variable selecting the backend variant.
pub const ENV_PLATFORM: &str = "TYPEDKV_PLATFORM";
/// Environment variable overriding the data directory.
pub const ENV_ROOT: &str = "TYPEDKV_ROOT";

/// Which backend variant instances are built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Per-key native engine
    Native,
    /// Local-storage snapshot fallback
    Web,
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Native
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Native => f.write_str("native"),
            Platform::Web => f.write_str("web"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "native" => Ok(Platform::Native),
            "web" => Ok(Platform::Web),
            _ => Err(StorageError::InvalidArgument(format!("unknown platform: {}", s))),
        }
    }
}

/// Configuration for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend variant for every instance of the registry
    pub platform: Platform,
    /// Data directory for durable backends
    pub root: PathBuf,
    /// Keep everything in memory (nothing survives the process)
    pub ephemeral: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Native,
            root: ".typedkv".into(),
            ephemeral: false,
        }
    }
}

impl StorageConfig {
    /// Durable configuration rooted at `root`.
    pub fn new(platform: Platform, root: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            root: root.into(),
            ephemeral: false,
        }
    }

    /// In-memory configuration.
    pub fn in_memory(platform: Platform) -> Self {
        Self {
            platform,
            ephemeral: true,
            ..Default::default()
        }
    }

    /// Read configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply `TYPEDKV_PLATFORM` and `TYPEDKV_ROOT` on top of this configuration.
    ///
    /// An unparseable platform is ignored with a warning.
    pub fn with_env(mut self) -> Self {
        if let Ok(platform) = std::env::var(ENV_PLATFORM) {
            match platform.parse() {
                Ok(p) => self.platform = p,
                Err(e) => warn!("Ignoring {}: {}", ENV_PLATFORM, e),
            }
        }
        if let Ok(root) = std::env::var(ENV_ROOT) {
            if !root.is_empty() {
                self.root = root.into();
            }
        }
        self
    }

    /// Set the platform.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Set the data directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Directory holding native engine data.
    pub fn native_dir(&self) -> PathBuf {
        self.root.join("native")
    }

    /// Directory emulating the browser's local storage.
    pub fn local_storage_dir(&self) -> PathBuf {
        self.root.join("local_storage")
    }
}
