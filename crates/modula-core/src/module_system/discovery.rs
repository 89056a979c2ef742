//! Module discovery from a directory tree and from package-manager metadata.
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::kernel::error::Result;
use crate::module_system::config::ModulesConfig;
use crate::module_system::descriptor::{LocalModuleSettings, ModuleDescriptor};
use crate::module_system::error::ModuleSystemError;
use crate::module_system::record::{Module, ModuleRecord, ModuleSource};
use crate::storage::StorageProvider;

/// Both metadata layouts: `{"packages": [...]}` and a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PackageMetadata {
    Current { packages: Vec<serde_json::Value> },
    Legacy(Vec<serde_json::Value>),
}

impl PackageMetadata {
    fn into_packages(self) -> Vec<serde_json::Value> {
        match self {
            PackageMetadata::Current { packages } => packages,
            PackageMetadata::Legacy(packages) => packages,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PackageEntry {
    name: String,
    #[serde(rename = "install-path")]
    install_path: Option<String>,
    #[serde(default)]
    extra: PackageExtra,
}

#[derive(Debug, Default, Deserialize)]
struct PackageExtra {
    module: Option<ModuleDeclaration>,
    #[serde(rename = "laravel-module")]
    laravel_module: Option<ModuleDeclaration>,
}

/// Module declaration carried by a package
#[derive(Debug, Clone, Deserialize)]
struct ModuleDeclaration {
    name: String,
    class: Option<String>,
}

/// Produces [`ModuleRecord`] candidates
#[derive(Debug, Clone)]
pub struct Discoverer {
    provider: Arc<dyn StorageProvider>,
    root: PathBuf,
    namespace: String,
    default_priority: i64,
    package_metadata: Option<PathBuf>,
}

impl Discoverer {
    pub fn new(provider: Arc<dyn StorageProvider>, config: &ModulesConfig) -> Self {
        Self {
            provider,
            root: config.path.clone(),
            namespace: config.namespace.clone(),
            default_priority: config.default_priority,
            package_metadata: config
                .scan_composer_packages
                .then(|| config.composer_metadata.clone()),
        }
    }

    /// Full discovery: the module root, then package metadata when enabled,
    /// merged and sorted by priority
    pub fn discover(&self) -> Result<Vec<ModuleRecord>> {
        let local = self.scan_directory(&self.root)?;
        let packaged = match &self.package_metadata {
            Some(file) => self.scan_package_metadata(file),
            None => Vec::new(),
        };
        let mut modules = Self::merge_discovered(local, packaged);
        Self::sort_by_priority(&mut modules);
        log::info!("Discovered {} module(s)", modules.len());
        Ok(modules)
    }

    /// Resolve every immediate subdirectory of `root` to a module.
    ///
    /// Subdirectories that do not resolve are skipped with a warning; a
    /// missing root gives an empty list. Only a root that exists but cannot
    /// be listed is an error.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<ModuleRecord>> {
        if !self.provider.exists(root) {
            log::debug!("Module root {} does not exist", root.display());
            return Ok(Vec::new());
        }
        let entries = self.provider.read_dir(root).map_err(|e| ModuleSystemError::RootUnreadable {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut seen = HashSet::new();
        let mut modules = Vec::new();
        for dir in entries.into_iter().filter(|entry| self.provider.is_dir(entry)) {
            match self.resolve_directory(&dir) {
                Ok(record) if !seen.insert(record.name().to_string()) => {
                    log::warn!(
                        "Skipping {}: module '{}' was already discovered",
                        dir.display(),
                        record.name()
                    );
                }
                Ok(record) => modules.push(record),
                Err(e) => log::warn!("{}", e),
            }
        }
        Ok(modules)
    }

    /// Build the record for a single module directory
    pub fn resolve_directory(&self, dir: &Path) -> Result<ModuleRecord> {
        let descriptor = ModuleDescriptor::load(self.provider.as_ref(), dir)?;
        let settings = LocalModuleSettings::load(self.provider.as_ref(), dir);
        Ok(ModuleRecord::from_descriptor(
            &descriptor,
            dir,
            &self.namespace,
            self.default_priority,
            &settings,
        ))
    }

    /// Modules declared by packages in a package-manager metadata file.
    ///
    /// Never fails: an absent or unparseable file yields an empty list.
    pub fn scan_package_metadata(&self, file: &Path) -> Vec<ModuleRecord> {
        if !self.provider.is_file(file) {
            log::debug!("No package metadata at {}", file.display());
            return Vec::new();
        }
        let metadata: PackageMetadata = match self
            .provider
            .read_to_string(file)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
        {
            Ok(metadata) => metadata,
            Err(message) => {
                log::warn!("Ignoring package metadata {}: {}", file.display(), message);
                return Vec::new();
            }
        };

        let base = file.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut modules: Vec<ModuleRecord> = Vec::new();
        for value in metadata.into_packages() {
            let package: PackageEntry = match serde_json::from_value(value) {
                Ok(package) => package,
                Err(e) => {
                    log::warn!("Skipping package entry in {}: {}", file.display(), e);
                    continue;
                }
            };
            let Some(declaration) = package.extra.module.clone().or_else(|| package.extra.laravel_module.clone()) else {
                continue;
            };
            if declaration.name.trim().is_empty() {
                log::warn!("Package '{}' declares a module without a name", package.name);
                continue;
            }
            let record = self.resolve_package(&base, &package, &declaration);
            if modules.iter().any(|m| m.name() == record.name()) {
                log::warn!("Package '{}' redeclares module '{}'", package.name, record.name());
                continue;
            }
            modules.push(record);
        }
        modules
    }

    fn resolve_package(&self, base: &Path, package: &PackageEntry, declaration: &ModuleDeclaration) -> ModuleRecord {
        let install_dir = match &package.install_path {
            Some(install_path) => base.join(install_path),
            None => base.join("..").join(&package.name),
        };

        let mut descriptor = if self.provider.is_file(&ModuleDescriptor::path_in(&install_dir)) {
            ModuleDescriptor::load(self.provider.as_ref(), &install_dir).unwrap_or_else(|e| {
                log::warn!("{}", e);
                ModuleDescriptor::default()
            })
        } else {
            ModuleDescriptor::default()
        };
        descriptor.name = declaration.name.clone();
        if descriptor.namespace.is_none() {
            descriptor.namespace = declaration
                .class
                .as_deref()
                .and_then(|class| class.trim_start_matches('\\').rsplit_once('\\'))
                .map(|(namespace, _)| namespace.to_string());
        }

        let settings = LocalModuleSettings::load(self.provider.as_ref(), &install_dir);
        ModuleRecord::from_descriptor(&descriptor, install_dir, &self.namespace, self.default_priority, &settings)
            .with_source(ModuleSource::Package)
    }

    /// Combine both sources; on a name collision the filesystem record wins
    pub fn merge_discovered(local: Vec<ModuleRecord>, packaged: Vec<ModuleRecord>) -> Vec<ModuleRecord> {
        let mut merged = local;
        for record in packaged {
            if merged.iter().any(|existing| existing.name() == record.name()) {
                log::debug!("Package module '{}' shadowed by the module directory", record.name());
                continue;
            }
            merged.push(record);
        }
        merged
    }

    /// Stable sort, highest priority first
    pub fn sort_by_priority(modules: &mut [ModuleRecord]) {
        modules.sort_by_key(|module| std::cmp::Reverse(module.priority()));
    }
}
