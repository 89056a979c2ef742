//! # Modula Core Storage
//!
//! Filesystem and cache collaborators used by discovery, the manifest store
//! and the component loader.
//!
//! - **[`provider`]**: the [`StorageProvider`] trait every filesystem access
//!   goes through.
//! - **[`local`]**: [`LocalStorageProvider`], backed by `std::fs`, with atomic
//!   writes.
//! - **[`config`]**: [`ConfigData`] and [`ConfigFormat`] for JSON, TOML and
//!   YAML configuration files.
//! - **[`cache`]**: the key-value [`CacheStore`] with TTL, plus in-memory and
//!   file-backed implementations.
pub mod cache;
pub mod config;
pub mod error;
pub mod local;
pub mod provider;

/// Re-export key types
pub use cache::{CacheStore, FileCacheStore, MemoryCacheStore};
pub use config::{ConfigData, ConfigFormat};
pub use local::LocalStorageProvider;
pub use provider::StorageProvider;

// Test module declaration
#[cfg(test)]
mod tests;
