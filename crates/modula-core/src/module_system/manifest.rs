use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::module_system::config::ModulesConfig;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::record::{DEFAULT_VERSION, Module, ModuleRecord};
use crate::storage::StorageProvider;

/// Persisted state of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub enabled: bool,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_priority")]
    pub priority: i64,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_priority() -> i64 {
    constants::DEFAULT_PRIORITY
}

impl ManifestEntry {
    pub fn from_record(record: &ModuleRecord) -> Self {
        Self {
            enabled: record.is_enabled(),
            version: record.version().to_string(),
            priority: record.priority(),
        }
    }
}

/// Module name -> persisted state
pub type Manifest = BTreeMap<String, ManifestEntry>;

/// Durable store for module enabled state
#[derive(Debug, Clone)]
pub struct ManifestStore {
    provider: Arc<dyn StorageProvider>,
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(provider: Arc<dyn StorageProvider>, path: PathBuf) -> Self {
        Self { provider, path }
    }

    /// Store at the location `config` resolves to
    pub fn from_config(provider: Arc<dyn StorageProvider>, config: &ModulesConfig) -> Self {
        Self::new(provider, config.manifest_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the manifest.
    ///
    /// An absent, unreadable or malformed file yields an empty manifest;
    /// individual malformed entries are dropped.
    pub fn load(&self) -> Manifest {
        if !self.provider.is_file(&self.path) {
            log::debug!("No module manifest at {}", self.path.display());
            return Manifest::new();
        }
        let raw = match self.provider.read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Ignoring unreadable module manifest: {}", e);
                return Manifest::new();
            }
        };
        let document: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(e) => {
                log::warn!("Ignoring malformed module manifest {}: {}", self.path.display(), e);
                return Manifest::new();
            }
        };

        document
            .into_iter()
            .filter_map(|(name, value)| match serde_json::from_value::<ManifestEntry>(value) {
                Ok(entry) => Some((name, entry)),
                Err(e) => {
                    log::warn!("Ignoring manifest entry '{}': {}", name, e);
                    None
                }
            })
            .collect()
    }

    /// Write `entries` atomically, creating parent directories as needed
    pub fn save(&self, entries: &Manifest) -> Result<()> {
        let persistence = |message: String| ModuleSystemError::Persistence {
            path: self.path.clone(),
            message,
        };
        let encoded = serde_json::to_string_pretty(entries).map_err(|e| persistence(e.to_string()))?;
        self.provider
            .write_string(&self.path, &encoded)
            .map_err(|e| persistence(e.to_string()))?;
        log::debug!("Saved module manifest with {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// Snapshot of `records` as manifest entries
    pub fn entries_from(records: &[ModuleRecord]) -> Manifest {
        records
            .iter()
            .map(|record| (record.name().to_string(), ManifestEntry::from_record(record)))
            .collect()
    }

    /// Current manifest with `records` written over it.
    /// Entries for modules that were not discovered this time are kept.
    pub fn merged_with(&self, records: &[ModuleRecord]) -> Manifest {
        let mut manifest = self.load();
        manifest.extend(Self::entries_from(records));
        manifest
    }

    /// Apply persisted enabled state onto freshly discovered records
    pub fn reconcile(records: &mut [ModuleRecord], manifest: &Manifest) {
        for record in records.iter_mut() {
            if let Some(entry) = manifest.get(record.name()) {
                record.set_enabled(entry.enabled);
            }
        }
    }
}
