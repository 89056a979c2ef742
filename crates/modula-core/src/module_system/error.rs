//! # Modula Core Module System Errors
//!
//! Defines [`ModuleSystemError`], the typed failures of discovery, the
//! manifest store, dependency checks and the manager.
//!
//! Single-module operations (`find_or_fail`, `enable`, `disable`) surface
//! these directly. Aggregate operations log item-level variants such as
//! [`ModuleSystemError::DiscoveryItem`] and carry on.
use std::path::PathBuf;

use crate::module_system::dependency::DependencyError;

#[derive(Debug, thiserror::Error)]
pub enum ModuleSystemError {
    #[error("Module '{name}' not found")]
    NotFound { name: String },

    #[error("Module '{module}' has unsatisfied dependencies: {}", .missing.join(", "))]
    DependencyUnsatisfied { module: String, missing: Vec<String> },

    #[error("Failed to persist module manifest to '{path}': {message}")]
    Persistence { path: PathBuf, message: String },

    #[error("Skipped module candidate '{path}': {message}")]
    DiscoveryItem { path: PathBuf, message: String },

    #[error("Malformed module configuration '{path}': {message}")]
    ConfigMalformed { path: PathBuf, message: String },

    #[error("Module root '{path}' is unreadable: {message}")]
    RootUnreadable { path: PathBuf, message: String },

    #[error("Dependency resolution failed: {0}")]
    Dependency(#[from] DependencyError),

    #[error("Module cache '{key}' failed: {message}")]
    Cache { key: String, message: String },
}
