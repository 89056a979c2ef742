use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

use crate::kernel::error::Error;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::manifest::{Manifest, ManifestEntry, ManifestStore};
use crate::module_system::record::{Module, ModuleRecord};
use crate::module_system::tests::support::{config_for, CountingProvider};
use crate::storage::LocalStorageProvider;

fn entry(enabled: bool, version: &str, priority: i64) -> ManifestEntry {
    ManifestEntry { enabled, version: version.to_string(), priority }
}

#[test]
fn test_load_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = ManifestStore::new(Arc::new(LocalStorageProvider::default()), dir.path().join("modules.json"));

    assert!(store.load().is_empty());
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempdir().unwrap();
    let store = ManifestStore::new(
        Arc::new(LocalStorageProvider::default()),
        dir.path().join("storage/app/modules.json"),
    );

    let mut manifest = Manifest::new();
    manifest.insert("Blog".into(), entry(true, "1.2.0", 100));
    manifest.insert("Shop".into(), entry(false, "0.3.1", 50));

    store.save(&manifest).unwrap();
    let loaded = store.load();
    assert_eq!(loaded, manifest);

    // Saving what was loaded changes nothing
    store.save(&loaded).unwrap();
    assert_eq!(store.load(), manifest);
}

#[test]
fn test_saved_layout_is_name_keyed_object() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("modules.json");
    let store = ManifestStore::new(Arc::new(LocalStorageProvider::default()), path.clone());

    let mut manifest = Manifest::new();
    manifest.insert("Blog".into(), entry(true, "1.0.0", 100));
    store.save(&manifest).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(raw, serde_json::json!({ "Blog": { "enabled": true, "version": "1.0.0", "priority": 100 } }));
}

#[test]
fn test_malformed_manifest_is_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("modules.json");
    fs::write(&path, "[\"not\", \"an\", \"object\"]").unwrap();
    let store = ManifestStore::new(Arc::new(LocalStorageProvider::default()), path.clone());
    assert!(store.load().is_empty());

    fs::write(&path, "{ broken json").unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn test_malformed_entries_are_dropped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("modules.json");
    fs::write(
        &path,
        r#"{ "Blog": { "enabled": false }, "Shop": "yes", "Cart": { "enabled": "maybe" } }"#,
    )
    .unwrap();
    let store = ManifestStore::new(Arc::new(LocalStorageProvider::default()), path);

    let loaded = store.load();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded["Blog"], entry(false, "1.0.0", 100));
}

#[test]
fn test_save_failure_is_persistence_error() {
    let dir = tempdir().unwrap();
    let provider = CountingProvider::new();
    provider.fail_writes(true);
    let store = ManifestStore::new(provider, dir.path().join("modules.json"));

    let result = store.save(&Manifest::new());

    assert!(matches!(result, Err(Error::ModuleSystem(ModuleSystemError::Persistence { .. }))));
}

#[test]
fn test_path_from_config() {
    let dir = tempdir().unwrap();
    let provider = Arc::new(LocalStorageProvider::default());

    let mut config = config_for(dir.path());
    let store = ManifestStore::from_config(provider.clone(), &config);
    assert_eq!(store.path(), dir.path().join("storage/app/modules.json"));

    config.manifest_path = Some(dir.path().join("state/custom.json"));
    let store = ManifestStore::from_config(provider, &config);
    assert_eq!(store.path(), dir.path().join("state/custom.json"));
}

#[test]
fn test_reconcile_and_merge() {
    let dir = tempdir().unwrap();
    let store = ManifestStore::new(Arc::new(LocalStorageProvider::default()), dir.path().join("modules.json"));

    let mut existing = Manifest::new();
    existing.insert("Blog".into(), entry(false, "1.0.0", 100));
    existing.insert("Legacy".into(), entry(true, "0.1.0", 10));
    store.save(&existing).unwrap();

    let mut records = vec![
        ModuleRecord::new("Blog", dir.path().join("Blog"), "Modules", 100),
        ModuleRecord::new("Shop", dir.path().join("Shop"), "Modules", 50),
    ];
    ManifestStore::reconcile(&mut records, &store.load());
    assert!(!records[0].is_enabled(), "manifest state wins");
    assert!(records[1].is_enabled(), "unlisted modules keep their default");

    let merged = store.merged_with(&records);
    assert_eq!(merged.len(), 3, "entries for undiscovered modules are kept");
    assert!(merged.contains_key("Legacy"));
    assert_eq!(merged["Shop"], entry(true, "1.0.0", 50));
}
