use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::module_system::error::ModuleSystemError;
use crate::storage::{ConfigFormat, StorageProvider};

/// Contents of a module's `module.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleDescriptor {
    pub name: String,
    pub alias: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub namespace: Option<String>,
    pub priority: Option<i64>,
    pub requires: Vec<String>,
    pub providers: Vec<String>,
    pub keywords: Vec<String>,
}

impl ModuleDescriptor {
    pub fn path_in(module_dir: &Path) -> PathBuf {
        module_dir.join(constants::MODULE_DESCRIPTOR)
    }

    /// Read and validate the descriptor in `module_dir`.
    ///
    /// Fails with [`ModuleSystemError::DiscoveryItem`] when the file is
    /// missing, is not a JSON object or has an empty `name`.
    pub fn load(provider: &dyn StorageProvider, module_dir: &Path) -> Result<Self> {
        let path = Self::path_in(module_dir);
        let item_error = |message: String| ModuleSystemError::DiscoveryItem {
            path: module_dir.to_path_buf(),
            message,
        };

        if !provider.is_file(&path) {
            return Err(item_error(format!("no {} found", constants::MODULE_DESCRIPTOR)).into());
        }
        let raw = provider.read_to_string(&path)?;
        let descriptor: ModuleDescriptor = serde_json::from_str(&raw)
            .map_err(|e| item_error(format!("invalid {}: {}", constants::MODULE_DESCRIPTOR, e)))?;
        if descriptor.name.trim().is_empty() {
            return Err(item_error("descriptor has no module name".to_string()).into());
        }
        Ok(descriptor)
    }
}

/// Module-local settings from `config/config.{json,toml,yaml}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalModuleSettings {
    pub enabled: Option<bool>,
    pub priority: Option<i64>,
    pub dependencies: Option<Vec<String>>,
}

impl LocalModuleSettings {
    /// First settings file present in `module_dir/config`, in format order
    pub fn locate(provider: &dyn StorageProvider, module_dir: &Path) -> Option<PathBuf> {
        let config_dir = module_dir.join(constants::CONFIG_DIR);
        ConfigFormat::ALL
            .iter()
            .map(|format| {
                config_dir.join(format!("{}.{}", constants::MODULE_SETTINGS_STEM, format.extension()))
            })
            .find(|candidate| provider.is_file(candidate))
    }

    /// Settings for `module_dir`; absent or malformed files yield defaults
    pub fn load(provider: &dyn StorageProvider, module_dir: &Path) -> Self {
        let Some(path) = Self::locate(provider, module_dir) else {
            return Self::default();
        };
        match ConfigFormat::read_file::<LocalModuleSettings>(provider, &path) {
            Ok(settings) => settings,
            Err(e) => {
                let error = ModuleSystemError::ConfigMalformed { path, message: e.to_string() };
                log::warn!("{}; using defaults", error);
                Self::default()
            }
        }
    }
}
