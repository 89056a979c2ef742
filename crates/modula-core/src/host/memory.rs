use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::host::{
    CommandKernel, ConfigRepository, MigrationRegistrar, ModelBindings, RouteDefinition,
    RouteRegistrar, ServiceContainer, TranslationRegistrar, ViewRegistrar,
};
use crate::kernel::error::{Error, Result};
use crate::storage::ConfigData;

#[derive(Debug, Default)]
struct Recorded {
    config: BTreeMap<String, ConfigData>,
    providers: Vec<String>,
    routes: Vec<RouteDefinition>,
    views: Vec<(String, PathBuf)>,
    translations: Vec<(String, PathBuf)>,
    migrations: Vec<PathBuf>,
    commands: Vec<String>,
    observers: Vec<(String, String)>,
    policies: Vec<(String, String)>,
    rejected: BTreeSet<String>,
}

/// Host that records every registration it receives.
///
/// Backs `modula boot` and the tests. [`InMemoryHost::reject`] makes
/// registrations of a given class or namespace fail.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    state: Mutex<Recorded>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fail any later registration naming `item`
    pub fn reject(&self, item: &str) {
        self.lock().rejected.insert(item.to_string());
    }

    fn check(state: &Recorded, item: &str) -> Result<()> {
        if state.rejected.contains(item) {
            return Err(Error::Other(format!("host rejected '{}'", item)));
        }
        Ok(())
    }

    pub fn config(&self, key: &str) -> Option<ConfigData> {
        self.lock().config.get(key).cloned()
    }

    pub fn config_keys(&self) -> Vec<String> {
        self.lock().config.keys().cloned().collect()
    }

    pub fn providers(&self) -> Vec<String> {
        self.lock().providers.clone()
    }

    pub fn routes(&self) -> Vec<RouteDefinition> {
        self.lock().routes.clone()
    }

    pub fn views(&self) -> Vec<(String, PathBuf)> {
        self.lock().views.clone()
    }

    pub fn translations(&self) -> Vec<(String, PathBuf)> {
        self.lock().translations.clone()
    }

    pub fn migrations(&self) -> Vec<PathBuf> {
        self.lock().migrations.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    pub fn observers(&self) -> Vec<(String, String)> {
        self.lock().observers.clone()
    }

    pub fn policies(&self) -> Vec<(String, String)> {
        self.lock().policies.clone()
    }
}

impl ConfigRepository for InMemoryHost {
    fn merge(&self, key: &str, values: ConfigData) -> Result<()> {
        let mut state = self.lock();
        Self::check(&state, key)?;
        // Values already present win over module defaults
        let merged = match state.config.remove(key) {
            Some(existing) => {
                let mut merged = values;
                merged.merge(&existing);
                merged
            }
            None => values,
        };
        state.config.insert(key.to_string(), merged);
        Ok(())
    }
}

impl ServiceContainer for InMemoryHost {
    fn register(&self, provider: &str) -> Result<()> {
        let mut state = self.lock();
        Self::check(&state, provider)?;
        state.providers.push(provider.to_string());
        Ok(())
    }
}

impl RouteRegistrar for InMemoryHost {
    fn register(&self, route: RouteDefinition) -> Result<()> {
        let mut state = self.lock();
        Self::check(&state, &route.file.to_string_lossy())?;
        state.routes.push(route);
        Ok(())
    }
}

impl ViewRegistrar for InMemoryHost {
    fn add_namespace(&self, namespace: &str, path: &Path) -> Result<()> {
        let mut state = self.lock();
        Self::check(&state, namespace)?;
        state.views.push((namespace.to_string(), path.to_path_buf()));
        Ok(())
    }
}

impl TranslationRegistrar for InMemoryHost {
    fn add_namespace(&self, namespace: &str, path: &Path) -> Result<()> {
        let mut state = self.lock();
        Self::check(&state, namespace)?;
        state.translations.push((namespace.to_string(), path.to_path_buf()));
        Ok(())
    }
}

impl MigrationRegistrar for InMemoryHost {
    fn has_path(&self, path: &Path) -> bool {
        self.lock().migrations.iter().any(|p| p == path)
    }

    fn add_path(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        Self::check(&state, &path.to_string_lossy())?;
        state.migrations.push(path.to_path_buf());
        Ok(())
    }
}

impl CommandKernel for InMemoryHost {
    fn register(&self, command: &str) -> Result<()> {
        let mut state = self.lock();
        Self::check(&state, command)?;
        state.commands.push(command.to_string());
        Ok(())
    }
}

impl ModelBindings for InMemoryHost {
    fn observe(&self, model: &str, observer: &str) -> Result<()> {
        let mut state = self.lock();
        Self::check(&state, observer)?;
        state.observers.push((model.to_string(), observer.to_string()));
        Ok(())
    }

    fn policy(&self, model: &str, policy: &str) -> Result<()> {
        let mut state = self.lock();
        Self::check(&state, policy)?;
        state.policies.push((model.to_string(), policy.to_string()));
        Ok(())
    }
}
