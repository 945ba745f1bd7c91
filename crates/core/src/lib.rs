//! typedkv core data models.
//!
//! This crate defines the identifiers and value types shared by every
//! storage backend.

#![warn(missing_docs)]

// Instance identity
mod id;

// Typed values
mod value;

// Re-exports
pub use id::InstanceId;
pub use value::{CoreError, Entry, Kind, Value};
