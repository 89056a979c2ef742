use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::event::{ModuleEvent, SharedEventDispatcher};
use crate::host::Host;
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::module_system::{ComponentLoader, DefaultModuleManager, LoadReport, ModuleManager, ModulesConfig};
use crate::storage::{CacheStore, FileCacheStore, LocalStorageProvider, StorageProvider};

/// Main application struct wiring the module system together
#[derive(Debug)]
pub struct Application {
    config: ModulesConfig,
    events: SharedEventDispatcher,
    manager: Arc<DefaultModuleManager>,
    loader: ComponentLoader,
    booted: AtomicBool,
}

impl Application {
    /// Build an application from an already resolved configuration,
    /// backed by the local filesystem
    pub fn new(config: ModulesConfig, host: Host) -> Self {
        Self::with_provider(config, host, Arc::new(LocalStorageProvider::default()))
    }

    pub fn with_provider(config: ModulesConfig, host: Host, provider: Arc<dyn StorageProvider>) -> Self {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        let cache: Arc<dyn CacheStore> = Arc::new(FileCacheStore::new(
            provider.clone(),
            config.storage_path.join(constants::CACHE_DIR),
        ));
        let events = SharedEventDispatcher::new();
        let manager = DefaultModuleManager::new(config.clone(), provider.clone(), cache)
            .with_dispatcher(events.clone());
        log::debug!("Module root: {} ({} storage)", config.path.display(), provider.name());
        log::debug!("Module manifest: {}", config.manifest_file().display());

        Self {
            loader: ComponentLoader::new(provider, host, config.clone()),
            manager: Arc::new(manager),
            events,
            config,
            booted: AtomicBool::new(false),
        }
    }

    /// Application rooted at `root`, configured from `config_file` when given.
    /// Relative paths in the configuration resolve against `root`.
    pub fn from_root(root: &Path, config_file: Option<&Path>, host: Host) -> Result<Self> {
        let provider: Arc<dyn StorageProvider> = Arc::new(LocalStorageProvider::default());
        let config = Self::load_config(provider.as_ref(), root, config_file)?;
        Ok(Self::with_provider(config, host, provider))
    }

    /// Read the configuration file (if any) and resolve it against `root`
    pub fn load_config(provider: &dyn StorageProvider, root: &Path, config_file: Option<&Path>) -> Result<ModulesConfig> {
        let config = match config_file {
            Some(file) => {
                let file: PathBuf = if file.is_absolute() { file.to_path_buf() } else { root.join(file) };
                ModulesConfig::from_file(provider, &file)?
            }
            None => ModulesConfig::default(),
        };
        Ok(config.resolve_against(root))
    }

    pub fn config(&self) -> &ModulesConfig {
        &self.config
    }

    pub fn manager(&self) -> Arc<DefaultModuleManager> {
        self.manager.clone()
    }

    pub fn event_dispatcher(&self) -> &SharedEventDispatcher {
        &self.events
    }

    pub fn loader(&self) -> &ComponentLoader {
        &self.loader
    }

    pub fn is_booted(&self) -> bool {
        self.booted.load(Ordering::SeqCst)
    }

    /// Load every enabled module, highest priority first.
    ///
    /// Can run once per application.
    pub async fn boot(&self) -> Result<Vec<LoadReport>> {
        if self.booted.swap(true, Ordering::SeqCst) {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Boot,
                message: "Application already booted".to_string(),
            });
        }

        let modules = match self.manager.enabled().await {
            Ok(modules) => modules,
            Err(e) => {
                self.booted.store(false, Ordering::SeqCst);
                return Err(Error::KernelLifecycleError {
                    phase: KernelLifecyclePhase::Bootstrap,
                    message: e.to_string(),
                });
            }
        };
        let reports = self.loader.load_all(&modules);

        let loaded: Vec<&LoadReport> = reports.iter().filter(|r| r.is_loaded()).collect();
        if self.config.dispatch_events {
            for report in &loaded {
                let event = ModuleEvent::Loaded { name: report.module().to_string() };
                if let Err(e) = self.events.dispatch(&event).await {
                    log::warn!("Failed to dispatch {}: {}", event, e);
                }
            }
            if let Err(e) = self.events.dispatch(&ModuleEvent::Booted { count: loaded.len() }).await {
                log::warn!("Failed to dispatch boot event: {}", e);
            }
        }
        log::info!("Booted {} of {} enabled module(s)", loaded.len(), modules.len());
        Ok(reports)
    }
}
