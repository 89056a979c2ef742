use std::path::{Path, PathBuf};

use crate::module_system::config::ModulesConfig;
use crate::module_system::record::Module;

/// Per-module naming helpers.
///
/// Callers hold the context of the module they work for instead of relying
/// on any notion of a "current" module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleContext {
    name: String,
    lower_name: String,
    path: PathBuf,
    namespace: String,
    views_namespace: String,
}

impl ModuleContext {
    pub fn new(module: &dyn Module, config: &ModulesConfig) -> Self {
        Self {
            name: module.name().to_string(),
            lower_name: module.lower_name(),
            path: module.path().to_path_buf(),
            namespace: module.namespace().to_string(),
            views_namespace: config.views.namespace_format.apply(module.name()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lower_name(&self) -> &str {
        &self.lower_name
    }

    pub fn root(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the module
    pub fn path(&self, relative: &str) -> PathBuf {
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            self.path.clone()
        } else {
            self.path.join(relative)
        }
    }

    /// Config key under the module's namespace: `blog.per_page`
    pub fn config_key(&self, key: &str) -> String {
        if key.is_empty() {
            self.lower_name.clone()
        } else {
            format!("{}.{}", self.lower_name, key)
        }
    }

    pub fn views_namespace(&self) -> &str {
        &self.views_namespace
    }

    /// Namespaced view name: `blog::posts.index`
    pub fn view(&self, view: &str) -> String {
        format!("{}::{}", self.views_namespace, view)
    }

    /// Namespaced translation key: `blog::messages.welcome`
    pub fn trans(&self, key: &str) -> String {
        format!("{}::{}", self.lower_name, key)
    }

    /// Class name under the module namespace; `/` separators are accepted
    pub fn class(&self, relative: &str) -> String {
        let relative = relative.replace('/', "\\");
        format!("{}\\{}", self.namespace, relative.trim_matches('\\'))
    }

    /// Public asset URL path: `modules/blog/css/app.css`
    pub fn asset(&self, relative: &str) -> String {
        format!("modules/{}/{}", self.lower_name, relative.trim_start_matches('/'))
    }
}
