//! Fixtures shared by the module system tests.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::json;

use crate::kernel::error::{Error, Result};
use crate::module_system::ModulesConfig;
use crate::storage::{LocalStorageProvider, StorageProvider};

/// Create `<root>/<dir>/module.json` with the given descriptor fields
pub fn write_module(root: &Path, dir: &str, descriptor: serde_json::Value) -> PathBuf {
    let module_dir = root.join(dir);
    fs::create_dir_all(&module_dir).unwrap();
    fs::write(module_dir.join("module.json"), descriptor.to_string()).unwrap();
    module_dir
}

/// Module named `name` with a priority and dependencies
pub fn simple_module(root: &Path, name: &str, priority: i64, requires: &[&str]) -> PathBuf {
    write_module(root, name, json!({ "name": name, "priority": priority, "requires": requires }))
}

/// Create a file (and its parents) under `dir`
pub fn touch(dir: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// Config rooted at `app_root` with modules under `Modules`
pub fn config_for(app_root: &Path) -> ModulesConfig {
    ModulesConfig::default().resolve_against(app_root)
}

/// Local provider that counts writes and can be told to fail them
#[derive(Debug, Default)]
pub struct CountingProvider {
    inner: LocalStorageProvider,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl CountingProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl StorageProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.inner.read_to_string(path)
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::io(
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                "write_string",
                path.to_path_buf(),
            ));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_string(path, contents)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.inner.remove_file(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.inner.read_dir(path)
    }
}
