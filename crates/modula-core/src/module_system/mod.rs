//! # Modula Core Module System
//!
//! Discovery, persisted state, dependency checks and loading of modules.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`discovery`]**: [`Discoverer`] turns a module root directory (each
//!   subdirectory carrying a `module.json`) and, optionally, package-manager
//!   metadata into [`ModuleRecord`]s sorted by priority.
//! - **[`record`]**: the [`ModuleRecord`] data type and the [`Module`]
//!   capability trait.
//! - **[`manifest`]**: [`ManifestStore`], the durable `modules.json` holding
//!   each module's enabled flag.
//! - **[`dependency`]**: [`DependencyResolver`] for missing dependencies,
//!   enable eligibility and the dependency graph.
//! - **[`registry`]**: [`ModuleRegistry`], the memoized in-process snapshot
//!   with alias resolution.
//! - **[`manager`]**: the [`ModuleManager`] interface and
//!   [`DefaultModuleManager`], which ties discovery, manifest, cache and
//!   events together behind one lock.
//! - **[`loader`]**: [`ComponentLoader`], registering config, providers,
//!   routes, views and the other component categories with the host.
//! - **[`context`]**: [`ModuleContext`] naming helpers.
//! - **[`config`]**: [`ModulesConfig`] and the discovery toggles.
pub mod config;
pub mod context;
pub mod dependency;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod record;
pub mod registry;

pub use config::{DiscoveryToggles, ModulesConfig, NamespaceFormat};
pub use context::ModuleContext;
pub use dependency::{DependencyError, DependencyGraph, DependencyResolver};
pub use descriptor::{LocalModuleSettings, ModuleDescriptor};
pub use discovery::Discoverer;
pub use loader::{CommandCatalog, ComponentCategory, ComponentLoader, LoadReport, LoadStatus};
pub use manager::{DefaultModuleManager, ModuleManager};
pub use manifest::{Manifest, ManifestEntry, ManifestStore};
pub use record::{Module, ModuleRecord, ModuleSource};
pub use registry::ModuleRegistry;

// Test module declaration
#[cfg(test)]
mod tests;
