//! Storage abstraction and implementations for typedkv.
//!
//! This crate provides a trait-based backend interface with two
//! implementations (a native per-key engine and a local-storage snapshot
//! fallback), the typed [`Instance`] façade written once against that
//! interface, and the [`Registry`] that hands out one façade per id.

#![warn(missing_docs)]

pub mod trait_;
pub mod config;
pub mod native;
pub mod file_engine;
pub mod snapshot;
pub mod local_store;
pub mod instance;
pub mod registry;

pub use trait_::{Backend, StorageError, Result};
pub use config::{Platform, StorageConfig};
pub use native::{MemoryEngine, NativeBackend, NativeEngine};
pub use file_engine::FileEngine;
pub use snapshot::SnapshotBackend;
pub use local_store::{FileLocalStore, LocalStore, MemoryLocalStore};
pub use instance::Instance;
pub use registry::{BackendFactory, Registry};

pub use typedkv_core::{Entry, InstanceId, Kind, Value};
