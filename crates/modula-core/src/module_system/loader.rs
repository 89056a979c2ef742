//! Registration of a module's components with the host.
//!
//! Categories run in the fixed order of [`ComponentCategory::ALL`]. A failing
//! item is logged and recorded in the [`LoadReport`]; it never aborts the
//! rest of the module.
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::host::{Host, RouteDefinition};
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::module_system::config::{DiscoveryToggles, ModulesConfig};
use crate::module_system::error::ModuleSystemError;
use crate::module_system::record::{Module, ModuleRecord};
use crate::storage::{ConfigData, ConfigFormat, StorageProvider};
use crate::utils;

/// Kinds of module sub-resources, in load order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    Config,
    Providers,
    Middleware,
    Routes,
    Views,
    Migrations,
    Translations,
    Commands,
    Events,
    Observers,
    Policies,
    Repositories,
}

impl ComponentCategory {
    pub const ALL: [ComponentCategory; 12] = [
        ComponentCategory::Config,
        ComponentCategory::Providers,
        ComponentCategory::Middleware,
        ComponentCategory::Routes,
        ComponentCategory::Views,
        ComponentCategory::Migrations,
        ComponentCategory::Translations,
        ComponentCategory::Commands,
        ComponentCategory::Events,
        ComponentCategory::Observers,
        ComponentCategory::Policies,
        ComponentCategory::Repositories,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ComponentCategory::Config => "config",
            ComponentCategory::Providers => "providers",
            ComponentCategory::Middleware => "middleware",
            ComponentCategory::Routes => "routes",
            ComponentCategory::Views => "views",
            ComponentCategory::Migrations => "migrations",
            ComponentCategory::Translations => "translations",
            ComponentCategory::Commands => "commands",
            ComponentCategory::Events => "events",
            ComponentCategory::Observers => "observers",
            ComponentCategory::Policies => "policies",
            ComponentCategory::Repositories => "repositories",
        }
    }

    /// Whether the discovery toggle for this category is on
    pub fn is_enabled(&self, toggles: &DiscoveryToggles) -> bool {
        match self {
            ComponentCategory::Config => toggles.config,
            ComponentCategory::Providers => toggles.providers,
            ComponentCategory::Middleware => toggles.middlewares,
            ComponentCategory::Routes => toggles.routes,
            ComponentCategory::Views => toggles.views,
            ComponentCategory::Migrations => toggles.migrations,
            ComponentCategory::Translations => toggles.translations,
            ComponentCategory::Commands => toggles.commands,
            ComponentCategory::Events => toggles.events,
            ComponentCategory::Observers => toggles.observers,
            ComponentCategory::Policies => toggles.policies,
            ComponentCategory::Repositories => toggles.repositories,
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An item a step could not register
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub category: ComponentCategory,
    pub item: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Loaded,
    /// Module is disabled; nothing ran
    Disabled,
    /// The module could not be loaded at all
    Failed(String),
}

/// Outcome of loading one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    module: String,
    status: LoadStatus,
    steps: Vec<(ComponentCategory, Vec<String>)>,
    skipped: Vec<SkippedItem>,
}

impl LoadReport {
    fn new(module: &str, status: LoadStatus) -> Self {
        Self {
            module: module.to_string(),
            status,
            steps: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loaded(&self) -> bool {
        self.status == LoadStatus::Loaded
    }

    /// Categories that ran, in order
    pub fn steps(&self) -> Vec<ComponentCategory> {
        self.steps.iter().map(|(category, _)| *category).collect()
    }

    /// Items registered (or enumerated) by a category
    pub fn items(&self, category: ComponentCategory) -> &[String] {
        self.steps
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn skipped(&self) -> &[SkippedItem] {
        &self.skipped
    }

    fn skip(&mut self, category: ComponentCategory, item: impl Into<String>, reason: impl fmt::Display) {
        let item = item.into();
        log::warn!("[{}] skipped {} item '{}': {}", self.module, category, item, reason);
        self.skipped.push(SkippedItem { category, item, reason: reason.to_string() });
    }
}

/// Command classes already handed to the host command kernel.
///
/// One catalog is threaded through a load run so a class found under
/// several command directories, or by several modules, registers once.
#[derive(Debug, Default, Clone)]
pub struct CommandCatalog {
    seen: HashSet<String>,
    commands: Vec<String>,
}

impl CommandCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `class`; false when it was already present
    pub fn insert(&mut self, class: &str) -> bool {
        if !self.seen.insert(class.to_string()) {
            return false;
        }
        self.commands.push(class.to_string());
        true
    }

    pub fn contains(&self, class: &str) -> bool {
        self.seen.contains(class)
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Drives per-module registration through the host collaborators
#[derive(Debug, Clone)]
pub struct ComponentLoader {
    provider: Arc<dyn StorageProvider>,
    host: Host,
    config: ModulesConfig,
}

impl ComponentLoader {
    pub fn new(provider: Arc<dyn StorageProvider>, host: Host, config: ModulesConfig) -> Self {
        Self { provider, host, config }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Load one module with a catalog of its own
    pub fn load_module(&self, module: &dyn Module) -> Result<LoadReport> {
        self.load_module_with(module, &mut CommandCatalog::new())
    }

    /// Load one module, sharing `catalog` with other loads.
    ///
    /// A disabled module yields a report with [`LoadStatus::Disabled`]. A
    /// missing module directory is an error.
    pub fn load_module_with(&self, module: &dyn Module, catalog: &mut CommandCatalog) -> Result<LoadReport> {
        if !module.is_enabled() {
            log::debug!("Module '{}' is disabled; not loading", module.name());
            return Ok(LoadReport::new(module.name(), LoadStatus::Disabled));
        }
        if !self.provider.is_dir(module.path()) {
            return Err(ModuleSystemError::RootUnreadable {
                path: module.path().to_path_buf(),
                message: format!("directory of module '{}' is missing", module.name()),
            }
            .into());
        }

        let mut report = LoadReport::new(module.name(), LoadStatus::Loaded);
        for category in ComponentCategory::ALL {
            if !category.is_enabled(&self.config.discovery) {
                log::debug!("[{}] {} discovery disabled", module.name(), category);
                continue;
            }
            let items = match category {
                ComponentCategory::Config => self.load_config(module, &mut report),
                ComponentCategory::Providers => self.load_providers(module, &mut report),
                ComponentCategory::Middleware => self.classes_in(module, constants::MIDDLEWARE_DIR, category, &mut report),
                ComponentCategory::Routes => self.load_routes(module, &mut report),
                ComponentCategory::Views => self.load_views(module, &mut report),
                ComponentCategory::Migrations => self.load_migrations(module, &mut report),
                ComponentCategory::Translations => self.load_translations(module, &mut report),
                ComponentCategory::Commands => self.load_commands(module, catalog, &mut report),
                ComponentCategory::Events => self.classes_in(module, constants::EVENTS_DIR, category, &mut report),
                ComponentCategory::Observers => self.bind_to_models(module, category, &mut report),
                ComponentCategory::Policies => self.bind_to_models(module, category, &mut report),
                ComponentCategory::Repositories => {
                    self.classes_in(module, constants::REPOSITORIES_DIR, category, &mut report)
                }
            };
            log::trace!("[{}] {}: {} item(s)", module.name(), category, items.len());
            report.steps.push((category, items));
        }

        log::info!("Loaded module '{}'", module.name());
        Ok(report)
    }

    /// Load every module in order with one shared catalog.
    /// A module that fails is reported as such and the rest still load.
    pub fn load_all(&self, modules: &[ModuleRecord]) -> Vec<LoadReport> {
        let mut catalog = CommandCatalog::new();
        modules
            .iter()
            .map(|module| {
                self.load_module_with(module, &mut catalog).unwrap_or_else(|e| {
                    log::warn!("Failed to load module '{}': {}", module.name(), e);
                    LoadReport::new(module.name(), LoadStatus::Failed(e.to_string()))
                })
            })
            .collect()
    }

    /// Source files under `relative` with their class names
    fn sources(
        &self,
        module: &dyn Module,
        relative: &str,
        category: ComponentCategory,
        report: &mut LoadReport,
    ) -> Vec<(PathBuf, String)> {
        let dir = module.path().join(relative);
        match utils::files_with_extension(self.provider.as_ref(), &dir, constants::SOURCE_EXTENSION) {
            Ok(files) => files
                .into_iter()
                .filter_map(|file| {
                    let name = file.file_name()?.to_os_string();
                    let class = utils::class_name(module.namespace(), &Path::new(relative).join(name));
                    Some((file, class))
                })
                .collect(),
            Err(e) => {
                report.skip(category, relative, e);
                Vec::new()
            }
        }
    }

    fn classes_in(
        &self,
        module: &dyn Module,
        relative: &str,
        category: ComponentCategory,
        report: &mut LoadReport,
    ) -> Vec<String> {
        self.sources(module, relative, category, report)
            .into_iter()
            .map(|(_, class)| class)
            .collect()
    }

    fn load_config(&self, module: &dyn Module, report: &mut LoadReport) -> Vec<String> {
        let category = ComponentCategory::Config;
        let dir = module.path().join(constants::CONFIG_DIR);
        if !self.provider.is_dir(&dir) {
            return Vec::new();
        }
        let files = match self.provider.read_dir(&dir) {
            Ok(files) => files,
            Err(e) => {
                report.skip(category, constants::CONFIG_DIR, e);
                return Vec::new();
            }
        };

        let mut merged = Vec::new();
        for file in files {
            if !self.provider.is_file(&file) || ConfigFormat::from_path(&file).is_none() {
                continue;
            }
            let Some(stem) = utils::file_stem(&file) else { continue };
            let key = if stem == constants::MODULE_SETTINGS_STEM {
                module.lower_name()
            } else {
                format!("{}.{}", module.lower_name(), stem)
            };
            let result = ConfigData::load(self.provider.as_ref(), &file)
                .and_then(|data| self.host.config.merge(&key, data));
            match result {
                Ok(()) => merged.push(key),
                Err(e) => report.skip(category, file.display().to_string(), e),
            }
        }
        merged
    }

    fn load_providers(&self, module: &dyn Module, report: &mut LoadReport) -> Vec<String> {
        let category = ComponentCategory::Providers;
        let mut providers: Vec<String> = module.providers().to_vec();
        for dir in constants::PROVIDER_DIRS {
            for (_, class) in self.sources(module, dir, category, report) {
                if !providers.contains(&class) {
                    providers.push(class);
                }
            }
        }

        let mut registered = Vec::new();
        for provider in providers {
            match self.host.container.register(&provider) {
                Ok(()) => registered.push(provider),
                Err(e) => report.skip(category, provider, e),
            }
        }
        registered
    }

    fn load_routes(&self, module: &dyn Module, report: &mut LoadReport) -> Vec<String> {
        let category = ComponentCategory::Routes;
        let mut registered = Vec::new();
        for (file, _) in self.sources(module, constants::ROUTES_DIR, category, report) {
            let Some(stem) = utils::file_stem(&file) else { continue };
            let controllers = utils::studly(&stem);
            let namespace = self
                .provider
                .is_dir(&module.path().join(constants::CONTROLLERS_DIR).join(&controllers))
                .then(|| format!("{}\\Http\\Controllers\\{}", module.namespace(), controllers));
            let route = RouteDefinition {
                module: module.name().to_string(),
                file: file.clone(),
                middleware: self.config.middleware_for(&stem),
                name: stem,
                namespace,
            };
            let label = route.name.clone();
            match self.host.routes.register(route) {
                Ok(()) => registered.push(label),
                Err(e) => report.skip(category, file.display().to_string(), e),
            }
        }
        registered
    }

    fn load_views(&self, module: &dyn Module, report: &mut LoadReport) -> Vec<String> {
        let dir = module.path().join(constants::VIEWS_DIR);
        if !self.provider.is_dir(&dir) {
            return Vec::new();
        }
        let namespace = self.config.views.namespace_format.apply(module.name());
        match self.host.views.add_namespace(&namespace, &dir) {
            Ok(()) => vec![namespace],
            Err(e) => {
                report.skip(ComponentCategory::Views, namespace, e);
                Vec::new()
            }
        }
    }

    fn load_migrations(&self, module: &dyn Module, report: &mut LoadReport) -> Vec<String> {
        let dir = module.path().join(constants::MIGRATIONS_DIR);
        if !self.provider.is_dir(&dir) {
            return Vec::new();
        }
        if self.host.migrations.has_path(&dir) {
            log::debug!("[{}] migrations already registered", module.name());
            return Vec::new();
        }
        match self.host.migrations.add_path(&dir) {
            Ok(()) => vec![dir.display().to_string()],
            Err(e) => {
                report.skip(ComponentCategory::Migrations, dir.display().to_string(), e);
                Vec::new()
            }
        }
    }

    fn load_translations(&self, module: &dyn Module, report: &mut LoadReport) -> Vec<String> {
        let Some(dir) = constants::TRANSLATION_DIRS
            .iter()
            .map(|relative| module.path().join(relative))
            .find(|dir| self.provider.is_dir(dir))
        else {
            return Vec::new();
        };
        let namespace = module.lower_name();
        match self.host.translations.add_namespace(&namespace, &dir) {
            Ok(()) => vec![namespace],
            Err(e) => {
                report.skip(ComponentCategory::Translations, namespace, e);
                Vec::new()
            }
        }
    }

    fn load_commands(&self, module: &dyn Module, catalog: &mut CommandCatalog, report: &mut LoadReport) -> Vec<String> {
        let category = ComponentCategory::Commands;
        let mut registered = Vec::new();
        for dir in constants::COMMAND_DIRS {
            for (_, class) in self.sources(module, dir, category, report) {
                if !catalog.insert(&class) {
                    log::debug!("[{}] command {} already registered", module.name(), class);
                    continue;
                }
                match self.host.commands.register(&class) {
                    Ok(()) => registered.push(class),
                    Err(e) => report.skip(category, class, e),
                }
            }
        }
        registered
    }

    /// Attach `<Model>Observer` / `<Model>Policy` classes whose model exists
    fn bind_to_models(&self, module: &dyn Module, category: ComponentCategory, report: &mut LoadReport) -> Vec<String> {
        let (dir, suffix) = match category {
            ComponentCategory::Observers => (constants::OBSERVERS_DIR, "Observer"),
            _ => (constants::POLICIES_DIR, "Policy"),
        };
        let mut bound = Vec::new();
        for (file, class) in self.sources(module, dir, category, report) {
            let stem = utils::file_stem(&file).unwrap_or_default();
            let Some(model) = stem.strip_suffix(suffix).filter(|model| !model.is_empty()) else {
                report.skip(category, class, format!("not named <Model>{}", suffix));
                continue;
            };
            let model_file = Path::new(constants::MODELS_DIR).join(format!("{}.{}", model, constants::SOURCE_EXTENSION));
            if !self.provider.is_file(&module.path().join(&model_file)) {
                report.skip(category, class, format!("model {} not found", model));
                continue;
            }
            let model_class = utils::class_name(module.namespace(), &model_file);
            let result = match category {
                ComponentCategory::Observers => self.host.models.observe(&model_class, &class),
                _ => self.host.models.policy(&model_class, &class),
            };
            match result {
                Ok(()) => bound.push(class),
                Err(e) => report.skip(category, class, e),
            }
        }
        bound
    }
}
