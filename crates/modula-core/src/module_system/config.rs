//! Module system configuration.
//!
//! Every key is optional; a missing file section falls back to the defaults
//! below. Relative paths are resolved against the application root by
//! [`ModulesConfig::resolve_against`].
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::storage::{ConfigFormat, StorageProvider};
use crate::utils;

/// Top-level configuration for discovery, state persistence and loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Root scanned for module subdirectories
    pub path: PathBuf,
    /// Root namespace prefix
    pub namespace: String,
    /// Alias -> canonical module name
    pub aliases: BTreeMap<String, String>,
    pub default_priority: i64,
    /// Discovery cache switch
    pub cache: bool,
    pub cache_key: String,
    /// Cache lifetime in seconds; 0 keeps entries forever
    pub cache_duration: u64,
    pub dependency_check: bool,
    pub dispatch_events: bool,
    pub scan_composer_packages: bool,
    /// Package-manager metadata file
    pub composer_metadata: PathBuf,
    /// Route file stem -> middleware groups
    pub middleware_groups: BTreeMap<String, Vec<String>>,
    pub discovery: DiscoveryToggles,
    /// Base directory for the default manifest location and the file cache
    pub storage_path: PathBuf,
    /// Explicit manifest location, wins over `storage_path`
    pub manifest_path: Option<PathBuf>,
    pub views: ViewsConfig,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(constants::DEFAULT_MODULES_DIR),
            namespace: constants::DEFAULT_NAMESPACE.to_string(),
            aliases: BTreeMap::new(),
            default_priority: constants::DEFAULT_PRIORITY,
            cache: false,
            cache_key: constants::DEFAULT_CACHE_KEY.to_string(),
            cache_duration: constants::DEFAULT_CACHE_DURATION_SECS,
            dependency_check: true,
            dispatch_events: true,
            scan_composer_packages: false,
            composer_metadata: PathBuf::from(constants::DEFAULT_PACKAGE_METADATA),
            middleware_groups: BTreeMap::new(),
            discovery: DiscoveryToggles::default(),
            storage_path: PathBuf::from(constants::DEFAULT_STORAGE_DIR),
            manifest_path: None,
            views: ViewsConfig::default(),
        }
    }
}

impl ModulesConfig {
    /// Load a configuration file (JSON, TOML or YAML by extension)
    pub fn from_file(provider: &dyn StorageProvider, path: &Path) -> Result<Self> {
        ConfigFormat::read_file(provider, path).map_err(|e| match e {
            Error::StorageSystem(inner) => Error::Config {
                path: path.to_path_buf(),
                message: inner.to_string(),
            },
            other => other,
        })
    }

    /// Make every relative path absolute under `root`
    pub fn resolve_against(mut self, root: &Path) -> Self {
        let absolute = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { root.join(p) };
        self.path = absolute(&self.path);
        self.composer_metadata = absolute(&self.composer_metadata);
        self.storage_path = absolute(&self.storage_path);
        self.manifest_path = self.manifest_path.as_deref().map(absolute);
        self
    }

    /// Manifest location: `manifest_path` when set, else `<storage_path>/modules.json`
    pub fn manifest_file(&self) -> PathBuf {
        self.manifest_path
            .clone()
            .unwrap_or_else(|| self.storage_path.join(constants::MANIFEST_FILE))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_duration)
    }

    /// Middleware groups applied to a route file: the configured list,
    /// otherwise `[stem]` for `web` and `api`, otherwise none
    pub fn middleware_for(&self, stem: &str) -> Vec<String> {
        match self.middleware_groups.get(stem) {
            Some(groups) => groups.clone(),
            None if stem == "web" || stem == "api" => vec![stem.to_string()],
            None => Vec::new(),
        }
    }
}

/// Per-category switches for the component loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryToggles {
    pub config: bool,
    pub providers: bool,
    pub middlewares: bool,
    pub routes: bool,
    pub views: bool,
    pub migrations: bool,
    pub translations: bool,
    pub commands: bool,
    pub events: bool,
    pub observers: bool,
    pub policies: bool,
    pub repositories: bool,
}

impl Default for DiscoveryToggles {
    fn default() -> Self {
        Self {
            config: true,
            providers: true,
            middlewares: true,
            routes: true,
            views: true,
            migrations: true,
            translations: true,
            commands: true,
            events: true,
            observers: true,
            policies: true,
            repositories: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    pub namespace_format: NamespaceFormat,
}

/// Casing applied to a module name to form its view namespace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceFormat {
    #[default]
    Lower,
    Studly,
    Camel,
}

impl NamespaceFormat {
    pub fn apply(&self, name: &str) -> String {
        match self {
            NamespaceFormat::Lower => utils::lower(name),
            NamespaceFormat::Studly => utils::studly(name),
            NamespaceFormat::Camel => utils::camel(name),
        }
    }
}
