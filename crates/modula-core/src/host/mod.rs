//! # Modula Core Host Interfaces
//!
//! The environment modules are loaded into. The component loader only talks
//! to the host through these traits; [`InMemoryHost`] implements all of them
//! by recording every call.
pub mod memory;

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::kernel::error::Result;
use crate::storage::ConfigData;

pub use memory::InMemoryHost;

/// Global configuration repository
pub trait ConfigRepository: Send + Sync + Debug {
    /// Merge `values` under `key`; existing keys are kept when already set
    fn merge(&self, key: &str, values: ConfigData) -> Result<()>;
}

/// Dependency-injection container
pub trait ServiceContainer: Send + Sync + Debug {
    /// Register a service provider class
    fn register(&self, provider: &str) -> Result<()>;
}

/// One route definition file and how to mount it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    pub module: String,
    pub file: PathBuf,
    /// Route file stem, e.g. `web`
    pub name: String,
    pub middleware: Vec<String>,
    /// Controller namespace, when the module has a matching controller directory
    pub namespace: Option<String>,
}

pub trait RouteRegistrar: Send + Sync + Debug {
    fn register(&self, route: RouteDefinition) -> Result<()>;
}

pub trait ViewRegistrar: Send + Sync + Debug {
    fn add_namespace(&self, namespace: &str, path: &Path) -> Result<()>;
}

pub trait TranslationRegistrar: Send + Sync + Debug {
    fn add_namespace(&self, namespace: &str, path: &Path) -> Result<()>;
}

pub trait MigrationRegistrar: Send + Sync + Debug {
    fn has_path(&self, path: &Path) -> bool;

    fn add_path(&self, path: &Path) -> Result<()>;
}

/// CLI command kernel
pub trait CommandKernel: Send + Sync + Debug {
    fn register(&self, command: &str) -> Result<()>;
}

/// Model observer and policy registration
pub trait ModelBindings: Send + Sync + Debug {
    fn observe(&self, model: &str, observer: &str) -> Result<()>;

    fn policy(&self, model: &str, policy: &str) -> Result<()>;
}

/// Bundle of host collaborators handed to the component loader
#[derive(Debug, Clone)]
pub struct Host {
    pub config: Arc<dyn ConfigRepository>,
    pub container: Arc<dyn ServiceContainer>,
    pub routes: Arc<dyn RouteRegistrar>,
    pub views: Arc<dyn ViewRegistrar>,
    pub translations: Arc<dyn TranslationRegistrar>,
    pub migrations: Arc<dyn MigrationRegistrar>,
    pub commands: Arc<dyn CommandKernel>,
    pub models: Arc<dyn ModelBindings>,
}

impl Host {
    /// Every collaborator backed by one shared recorder
    pub fn from_memory(recorder: Arc<InMemoryHost>) -> Self {
        Self {
            config: recorder.clone(),
            container: recorder.clone(),
            routes: recorder.clone(),
            views: recorder.clone(),
            translations: recorder.clone(),
            migrations: recorder.clone(),
            commands: recorder.clone(),
            models: recorder,
        }
    }

    /// Host plus the recorder behind it
    pub fn in_memory() -> (Self, Arc<InMemoryHost>) {
        let recorder = Arc::new(InMemoryHost::new());
        (Self::from_memory(recorder.clone()), recorder)
    }
}

#[cfg(test)]
mod tests;
