//! File-backed native engine.
//!
//! Stores each key as its own JSON file under a per-instance directory:
//!
//! ```text
//! <root>/<stem(instance)>/<stem(key)>.json   {"key": "...", "value": <primitive>}
//! ```
//!
//! A stem is the hex encoding of the name while that stays short, and a
//! `b3-` prefixed BLAKE3 digest otherwise, so any key or id maps to a safe
//! file name within the platform's name length limit. The record carries
//! the original key, so listing never decodes file names.
//! Writes go through a temp file and a rename, so a crash never leaves a
//! half-written value behind.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::{debug, warn};
use typedkv_core::InstanceId;

use crate::{NativeEngine, Result};

/// Longest hex stem used verbatim; longer names are digested.
const MAX_HEX_STEM: usize = 128;

/// On-disk record for one key.
#[derive(Debug, Serialize, Deserialize)]
struct KeyRecord {
    key: String,
    value: Json,
}

/// Durable, write-through engine for one instance.
#[derive(Debug)]
pub struct FileEngine {
    dir: PathBuf,
}

impl FileEngine {
    /// Open (creating if needed) the store of `id` under `root`.
    pub fn open(root: impl AsRef<Path>, id: &InstanceId) -> Result<Self> {
        let dir = root.as_ref().join(file_stem(id.as_str()));
        std::fs::create_dir_all(&dir)?;
        debug!("Opened native store for {} at {}", id, dir.display());
        Ok(Self { dir })
    }

    /// Directory holding this instance's files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }

    fn record_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

impl NativeEngine for FileEngine {
    fn set_raw(&mut self, key: &str, value: Json) -> Result<()> {
        let record = KeyRecord {
            key: key.to_string(),
            value,
        };
        let json = serde_json::to_string(&record)?;
        write_atomic(&self.key_path(key), json.as_bytes())
    }

    fn get_raw(&self, key: &str) -> Result<Option<Json>> {
        Ok(read_record(&self.key_path(key))?.map(|r| r.value))
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        remove_if_exists(&self.key_path(key))
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(read_record(&self.key_path(key))?.is_some())
    }

    fn all_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for path in self.record_paths()? {
            if let Ok(Some(record)) = read_record(&path) {
                keys.push(record.key);
            }
        }
        Ok(keys)
    }

    fn clear_all(&mut self) -> Result<()> {
        for path in self.record_paths()? {
            remove_if_exists(&path)?;
        }
        Ok(())
    }
}

/// Read a key record. Unreadable records count as absent.
fn read_record(path: &Path) -> Result<Option<KeyRecord>> {
    match std::fs::read_to_string(path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("Ignoring corrupt record {}: {}", path.display(), e);
                Ok(None)
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    std::fs::remove_file(path).or_else(|e| {
        if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
    })?;
    Ok(())
}

/// Map a name to a file-system safe stem of bounded length.
///
/// Hex stems only contain `[0-9a-f]`, so they never collide with the
/// `b3-` digest form.
pub(crate) fn file_stem(name: &str) -> String {
    if name.len() * 2 <= MAX_HEX_STEM {
        name.bytes().map(|b| format!("{:02x}", b)).collect()
    } else {
        format!("b3-{}", blake3::hash(name.as_bytes()).to_hex())
    }
}

/// Write `bytes` to a temp file next to `path`, then rename it into place.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, bytes)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}
