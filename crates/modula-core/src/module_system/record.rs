use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::module_system::descriptor::{LocalModuleSettings, ModuleDescriptor};
use crate::utils;

/// Version recorded when a descriptor does not carry one
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Capability interface of a module, as consumed by the loader and helpers
pub trait Module: fmt::Debug + Send + Sync {
    /// Canonical StudlyCase name
    fn name(&self) -> &str;

    /// Absolute module root
    fn path(&self) -> &Path;

    /// Class namespace, e.g. `Modules\Blog`
    fn namespace(&self) -> &str;

    fn priority(&self) -> i64;

    fn is_enabled(&self) -> bool;

    /// Names of the modules this one requires
    fn dependencies(&self) -> &[String];

    /// Fully-qualified service provider classes declared by the module
    fn providers(&self) -> &[String] {
        &[]
    }

    /// Lowercase name, used for config and translation namespaces
    fn lower_name(&self) -> String {
        utils::lower(self.name())
    }
}

/// Where a module was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleSource {
    Filesystem,
    Package,
}

/// One discovered module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    name: String,
    path: PathBuf,
    namespace: String,
    enabled: bool,
    priority: i64,
    dependencies: Vec<String>,
    version: String,
    description: Option<String>,
    aliases: Vec<String>,
    providers: Vec<String>,
    keywords: Vec<String>,
    source: ModuleSource,
}

impl ModuleRecord {
    /// Bare record: enabled, no dependencies, namespace `<root_namespace>\<Name>`
    pub fn new(name: &str, path: impl Into<PathBuf>, root_namespace: &str, priority: i64) -> Self {
        let name = utils::studly(name);
        Self {
            namespace: Self::namespace_for(root_namespace, &name),
            name,
            path: path.into(),
            enabled: true,
            priority,
            dependencies: Vec::new(),
            version: DEFAULT_VERSION.to_string(),
            description: None,
            aliases: Vec::new(),
            providers: Vec::new(),
            keywords: Vec::new(),
            source: ModuleSource::Filesystem,
        }
    }

    /// Build a record from a descriptor and the module-local settings.
    ///
    /// Local settings win: `enabled` and `priority` override the descriptor,
    /// `dependencies` extend `requires`.
    pub fn from_descriptor(
        descriptor: &ModuleDescriptor,
        path: impl Into<PathBuf>,
        root_namespace: &str,
        default_priority: i64,
        settings: &LocalModuleSettings,
    ) -> Self {
        let mut record = Self::new(
            &descriptor.name,
            path,
            root_namespace,
            settings.priority.or(descriptor.priority).unwrap_or(default_priority),
        );

        if let Some(namespace) = descriptor.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            record.namespace = namespace.trim_end_matches('\\').to_string();
        }
        record.enabled = settings.enabled.unwrap_or(true);
        record.dependencies = Vec::new();
        for dependency in descriptor.requires.iter().chain(settings.dependencies.iter().flatten()) {
            let dependency = utils::studly(dependency);
            if !record.dependencies.contains(&dependency) {
                record.dependencies.push(dependency);
            }
        }
        if let Some(version) = descriptor.version.as_deref().filter(|v| !v.is_empty()) {
            record.version = version.to_string();
        }
        record.description = descriptor.description.clone();
        record.aliases = descriptor.alias.iter().map(|a| a.to_lowercase()).collect();
        record.providers = descriptor.providers.clone();
        record.keywords = descriptor.keywords.clone();
        record
    }

    fn namespace_for(root_namespace: &str, name: &str) -> String {
        let root = root_namespace.trim_end_matches('\\');
        if root.is_empty() {
            name.to_string()
        } else {
            format!("{}\\{}", root, name)
        }
    }

    /// Dependency names are stored in the same StudlyCase form as module names
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dependencies = dependencies.into_iter().map(|d| utils::studly(d.as_ref())).collect();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.trim_end_matches('\\').to_string();
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.aliases = aliases.into_iter().map(|a| a.as_ref().to_lowercase()).collect();
        self
    }

    pub fn with_providers<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers = providers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_source(mut self, source: ModuleSource) -> Self {
        self.source = source;
        self
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn source(&self) -> ModuleSource {
        self.source
    }

    /// Whether `alias` (compared case-insensitively) names this module
    pub fn answers_to(&self, alias: &str) -> bool {
        let alias = alias.to_lowercase();
        self.aliases.iter().any(|a| *a == alias)
    }
}

impl Module for ModuleRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn priority(&self) -> i64 {
        self.priority
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    fn providers(&self) -> &[String] {
        &self.providers
    }
}

impl fmt::Display for ModuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{} [{}] priority {}",
            self.name,
            self.version,
            if self.enabled { "enabled" } else { "disabled" },
            self.priority
        )
    }
}
