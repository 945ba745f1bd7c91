//! Instance registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;
use typedkv_core::InstanceId;

use crate::{
    Backend, FileEngine, FileLocalStore, Instance, MemoryLocalStore, NativeBackend, Platform,
    Result, SnapshotBackend, StorageConfig,
};

/// Builds the backend of a newly requested instance.
pub type BackendFactory = Box<dyn Fn(&InstanceId) -> Result<Box<dyn Backend>> + Send + Sync>;

/// Hands out one [`Instance`] per id.
///
/// Instances are created on first lookup and kept for the registry's
/// lifetime; there is no eviction. Construction happens under the registry
/// lock, so concurrent first lookups of the same id build a single backend.
///
/// The registry is an ordinary value: create it at start-up and pass it (or
/// an `Arc` of it) to whoever needs storage.
pub struct Registry {
    platform: Platform,
    factory: BackendFactory,
    instances: Mutex<HashMap<InstanceId, Arc<Instance>>>,
}

impl Registry {
    /// Create a registry whose instances use the backend selected by `config`.
    pub fn new(config: StorageConfig) -> Result<Self> {
        let platform = config.platform;
        let factory = factory_for(&config)?;
        info!(
            "Opened {} registry ({})",
            platform,
            if config.ephemeral { "in memory".to_string() } else { config.root.display().to_string() }
        );
        Ok(Self::with_factory(platform, factory))
    }

    /// Create a registry with a custom backend factory.
    pub fn with_factory(platform: Platform, factory: BackendFactory) -> Self {
        Self {
            platform,
            factory,
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Backend variant of this registry's instances.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The default instance.
    pub fn default_instance(&self) -> Result<Arc<Instance>> {
        self.instance(InstanceId::default_id())
    }

    /// The instance named `id`, created on first use.
    pub fn instance(&self, id: impl Into<InstanceId>) -> Result<Arc<Instance>> {
        let id = id.into();
        let mut instances = self.instances.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = instances.get(&id) {
            return Ok(Arc::clone(instance));
        }

        let backend = (self.factory)(&id)?;
        let instance = Arc::new(Instance::from_boxed(id.clone(), backend));
        info!("Created {} instance {}", self.platform, id);
        instances.insert(id, Arc::clone(&instance));
        Ok(instance)
    }

    /// Ids of the instances created so far.
    pub fn instance_ids(&self) -> Vec<InstanceId> {
        let instances = self.instances.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<_> = instances.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("platform", &self.platform)
            .field("instances", &self.instance_ids())
            .finish()
    }
}

/// Backend factory for a configuration.
///
/// Web instances of one registry share a single local store, as every page
/// shares one `localStorage`.
fn factory_for(config: &StorageConfig) -> Result<BackendFactory> {
    let factory: BackendFactory = match (config.platform, config.ephemeral) {
        (Platform::Native, true) => Box::new(|_: &InstanceId| -> Result<Box<dyn Backend>> {
            Ok(Box::new(NativeBackend::in_memory()))
        }),
        (Platform::Native, false) => {
            let dir = config.native_dir();
            Box::new(move |id: &InstanceId| -> Result<Box<dyn Backend>> {
                Ok(Box::new(NativeBackend::new(FileEngine::open(&dir, id)?)))
            })
        }
        (Platform::Web, true) => {
            let store = MemoryLocalStore::new();
            Box::new(move |id: &InstanceId| -> Result<Box<dyn Backend>> {
                Ok(Box::new(SnapshotBackend::open(id, store.clone())))
            })
        }
        (Platform::Web, false) => {
            let store = FileLocalStore::open(config.local_storage_dir())?;
            Box::new(move |id: &InstanceId| -> Result<Box<dyn Backend>> {
                Ok(Box::new(SnapshotBackend::open(id, store.clone())))
            })
        }
    };
    Ok(factory)
}
