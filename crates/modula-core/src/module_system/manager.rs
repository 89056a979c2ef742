use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::event::{ModuleEvent, SharedEventDispatcher};
use crate::kernel::error::Result;
use crate::module_system::config::ModulesConfig;
use crate::module_system::context::ModuleContext;
use crate::module_system::dependency::{DependencyGraph, DependencyResolver};
use crate::module_system::discovery::Discoverer;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::manifest::ManifestStore;
use crate::module_system::record::{Module, ModuleRecord};
use crate::module_system::registry::ModuleRegistry;
use crate::storage::{CacheStore, StorageProvider};

/// Module lifecycle interface
#[async_trait]
pub trait ModuleManager: Send + Sync + Debug {
    /// Every discovered module, highest priority first
    async fn all(&self) -> Result<Vec<ModuleRecord>>;

    async fn enabled(&self) -> Result<Vec<ModuleRecord>>;

    async fn disabled(&self) -> Result<Vec<ModuleRecord>>;

    /// Whether `name` (or an alias of it) is a known module
    async fn exists(&self, name: &str) -> Result<bool>;

    async fn find(&self, name: &str) -> Result<Option<ModuleRecord>>;

    /// Like [`find`](ModuleManager::find), failing with `NotFound`
    async fn find_or_fail(&self, name: &str) -> Result<ModuleRecord>;

    /// Switch a module on; its dependencies must be present and enabled
    async fn enable(&self, name: &str) -> Result<()>;

    async fn disable(&self, name: &str) -> Result<()>;

    /// Rediscover and write the result to the cache store; returns the module count
    async fn cache(&self) -> Result<usize>;

    /// Drop cached discovery results and in-process memoization
    async fn clear_cache(&self) -> Result<()>;

    async fn missing_dependencies(&self, name: &str) -> Result<Vec<String>>;

    async fn can_enable(&self, name: &str) -> Result<bool>;

    async fn dependency_graph(&self) -> Result<DependencyGraph>;

    /// Modules that declare `name` as a dependency
    async fn dependents(&self, name: &str) -> Result<Vec<String>>;

    /// Persist the current enabled state of every module
    async fn save_manifest(&self) -> Result<()>;

    async fn count(&self) -> Result<usize>;

    /// Forget everything and discover again; returns the module count
    async fn rediscover(&self) -> Result<usize>;

    async fn context(&self, name: &str) -> Result<ModuleContext>;
}

/// Default implementation of module manager
pub struct DefaultModuleManager {
    config: ModulesConfig,
    discoverer: Discoverer,
    manifest: ManifestStore,
    cache: Arc<dyn CacheStore>,
    events: Option<SharedEventDispatcher>,
    registry: Mutex<ModuleRegistry>,
}

impl DefaultModuleManager {
    pub fn new(config: ModulesConfig, provider: Arc<dyn StorageProvider>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            discoverer: Discoverer::new(provider.clone(), &config),
            manifest: ManifestStore::from_config(provider, &config),
            registry: Mutex::new(ModuleRegistry::new(config.aliases.clone())),
            config,
            cache,
            events: None,
        }
    }

    /// Emit lifecycle events through `dispatcher`
    pub fn with_dispatcher(mut self, dispatcher: SharedEventDispatcher) -> Self {
        self.events = Some(dispatcher);
        self
    }

    pub fn config(&self) -> &ModulesConfig {
        &self.config
    }

    pub fn manifest_store(&self) -> &ManifestStore {
        &self.manifest
    }

    async fn dispatch(&self, event: ModuleEvent) {
        if !self.config.dispatch_events {
            return;
        }
        if let Some(events) = &self.events {
            if let Err(e) = events.dispatch(&event).await {
                log::warn!("Failed to dispatch {}: {}", event, e);
            }
        }
    }

    /// Fresh discovery with persisted state applied
    fn discover(&self) -> Result<Vec<ModuleRecord>> {
        let mut records = self.discoverer.discover()?;
        ManifestStore::reconcile(&mut records, &self.manifest.load());
        Ok(records)
    }

    fn cached_records(&self) -> Option<Vec<ModuleRecord>> {
        let key = &self.config.cache_key;
        let raw = self.cache.get(key)?;
        match serde_json::from_str::<Vec<ModuleRecord>>(&raw) {
            Ok(mut records) => {
                log::debug!("Using {} cached module record(s)", records.len());
                ManifestStore::reconcile(&mut records, &self.manifest.load());
                Some(records)
            }
            Err(e) => {
                log::warn!("Discarding unreadable module cache '{}': {}", key, e);
                self.forget_cache();
                None
            }
        }
    }

    fn store_cache(&self, records: &[ModuleRecord]) -> Result<()> {
        let cache_error = |message: String| ModuleSystemError::Cache {
            key: self.config.cache_key.clone(),
            message,
        };
        let encoded = serde_json::to_string(records).map_err(|e| cache_error(e.to_string()))?;
        self.cache
            .put(&self.config.cache_key, &encoded, self.config.cache_ttl())
            .map_err(|e| cache_error(e.to_string()))?;
        Ok(())
    }

    fn forget_cache(&self) {
        if let Err(e) = self.cache.forget(&self.config.cache_key) {
            log::warn!("Failed to forget module cache '{}': {}", self.config.cache_key, e);
        }
    }

    /// Populate the registry if needed; returns the count when a fresh
    /// discovery ran
    fn ensure_loaded(&self, registry: &mut ModuleRegistry) -> Result<Option<usize>> {
        if registry.is_loaded() {
            return Ok(None);
        }
        if self.config.cache {
            if let Some(records) = self.cached_records() {
                registry.set_modules(records);
                return Ok(None);
            }
        }
        let records = self.discover()?;
        if self.config.cache {
            if let Err(e) = self.store_cache(&records) {
                log::warn!("{}", e);
            }
        }
        registry.set_modules(records);
        Ok(Some(registry.len()))
    }

    /// Run `f` against a loaded registry under the lock, then announce a
    /// fresh discovery once the lock is released
    async fn with_registry<T, F>(&self, f: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut ModuleRegistry) -> Result<T> + Send,
    {
        let (result, discovered) = {
            let mut registry = self.registry.lock().await;
            let discovered = self.ensure_loaded(&mut registry)?;
            (f(&mut registry), discovered)
        };
        if let Some(count) = discovered {
            self.dispatch(ModuleEvent::Discovered { count }).await;
        }
        result
    }

    fn resolve(registry: &ModuleRegistry, name: &str) -> Result<String> {
        registry
            .resolve_name(name)
            .ok_or_else(|| ModuleSystemError::NotFound { name: name.to_string() }.into())
    }

    /// Flip the flag, drop cached views and persist. The flag is restored
    /// when the manifest cannot be written.
    fn set_state(&self, registry: &mut ModuleRegistry, name: &str, enabled: bool) -> Result<()> {
        let record = registry
            .find_mut(name)
            .ok_or_else(|| ModuleSystemError::NotFound { name: name.to_string() })?;
        record.set_enabled(enabled);
        registry.invalidate_filters();
        self.forget_cache();

        let manifest = self.manifest.merged_with(registry.modules());
        if let Err(e) = self.manifest.save(&manifest) {
            if let Some(record) = registry.find_mut(name) {
                record.set_enabled(!enabled);
            }
            registry.invalidate_filters();
            return Err(e);
        }
        Ok(())
    }

    /// Shared body of enable/disable. Already being in the target state is a
    /// no-op: no manifest write, no event.
    async fn switch(&self, name: &str, enabled: bool) -> Result<()> {
        let changed = self
            .with_registry(|registry| {
                let canonical = Self::resolve(registry, name)?;
                let already = registry.find(&canonical).map(|m| m.is_enabled() == enabled).unwrap_or(false);
                if already {
                    log::debug!("Module '{}' already {}", canonical, if enabled { "enabled" } else { "disabled" });
                    return Ok(None);
                }
                if enabled && self.config.dependency_check {
                    let missing = DependencyResolver::missing_dependencies(registry.modules(), &canonical);
                    if !missing.is_empty() {
                        return Err(ModuleSystemError::DependencyUnsatisfied { module: canonical, missing }.into());
                    }
                }
                self.set_state(registry, &canonical, enabled)?;
                Ok(Some(canonical))
            })
            .await?;

        if let Some(name) = changed {
            log::info!("Module '{}' {}", name, if enabled { "enabled" } else { "disabled" });
            let event = if enabled {
                ModuleEvent::Enabled { name }
            } else {
                ModuleEvent::Disabled { name }
            };
            self.dispatch(event).await;
        }
        Ok(())
    }
}

impl Debug for DefaultModuleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultModuleManager")
            .field("root", &self.config.path)
            .field("manifest", &self.manifest.path())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModuleManager for DefaultModuleManager {
    async fn all(&self) -> Result<Vec<ModuleRecord>> {
        self.with_registry(|registry| Ok(registry.modules().to_vec())).await
    }

    async fn enabled(&self) -> Result<Vec<ModuleRecord>> {
        self.with_registry(|registry| Ok(registry.enabled().to_vec())).await
    }

    async fn disabled(&self) -> Result<Vec<ModuleRecord>> {
        self.with_registry(|registry| Ok(registry.disabled().to_vec())).await
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        self.with_registry(|registry| Ok(registry.resolve_name(name).is_some())).await
    }

    async fn find(&self, name: &str) -> Result<Option<ModuleRecord>> {
        self.with_registry(|registry| Ok(registry.find(name).cloned())).await
    }

    async fn find_or_fail(&self, name: &str) -> Result<ModuleRecord> {
        self.find(name)
            .await?
            .ok_or_else(|| ModuleSystemError::NotFound { name: name.to_string() }.into())
    }

    async fn enable(&self, name: &str) -> Result<()> {
        self.switch(name, true).await
    }

    async fn disable(&self, name: &str) -> Result<()> {
        self.switch(name, false).await
    }

    async fn cache(&self) -> Result<usize> {
        let count = {
            let mut registry = self.registry.lock().await;
            let records = self.discover()?;
            self.store_cache(&records)?;
            registry.set_modules(records);
            registry.len()
        };
        log::info!("Cached {} module(s) under '{}'", count, self.config.cache_key);
        self.dispatch(ModuleEvent::CacheRefreshed { count }).await;
        Ok(count)
    }

    async fn clear_cache(&self) -> Result<()> {
        {
            let mut registry = self.registry.lock().await;
            self.cache.forget(&self.config.cache_key)?;
            registry.reset();
        }
        self.dispatch(ModuleEvent::CacheCleared).await;
        Ok(())
    }

    async fn missing_dependencies(&self, name: &str) -> Result<Vec<String>> {
        self.with_registry(|registry| {
            Ok(match registry.resolve_name(name) {
                Some(canonical) => DependencyResolver::missing_dependencies(registry.modules(), &canonical),
                None => Vec::new(),
            })
        })
        .await
    }

    async fn can_enable(&self, name: &str) -> Result<bool> {
        Ok(self.missing_dependencies(name).await?.is_empty())
    }

    async fn dependency_graph(&self) -> Result<DependencyGraph> {
        self.with_registry(|registry| Ok(DependencyResolver::dependency_graph(registry.modules())))
            .await
    }

    async fn dependents(&self, name: &str) -> Result<Vec<String>> {
        self.with_registry(|registry| {
            let canonical = Self::resolve(registry, name)?;
            Ok(DependencyResolver::dependents(registry.modules(), &canonical))
        })
        .await
    }

    async fn save_manifest(&self) -> Result<()> {
        self.with_registry(|registry| {
            self.manifest.save(&self.manifest.merged_with(registry.modules()))?;
            self.forget_cache();
            Ok(())
        })
        .await
    }

    async fn count(&self) -> Result<usize> {
        self.with_registry(|registry| Ok(registry.len())).await
    }

    async fn rediscover(&self) -> Result<usize> {
        {
            let mut registry = self.registry.lock().await;
            self.forget_cache();
            registry.reset();
        }
        self.count().await
    }

    async fn context(&self, name: &str) -> Result<ModuleContext> {
        let record = self.find_or_fail(name).await?;
        Ok(ModuleContext::new(&record, &self.config))
    }
}
