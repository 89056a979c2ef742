use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

use crate::kernel::error::Error;
use crate::module_system::config::{ModulesConfig, NamespaceFormat};
use crate::storage::LocalStorageProvider;

#[test]
fn test_defaults() {
    let config = ModulesConfig::default();

    assert_eq!(config.path, PathBuf::from("Modules"));
    assert_eq!(config.namespace, "Modules");
    assert_eq!(config.default_priority, 100);
    assert!(!config.cache);
    assert_eq!(config.cache_key, "modula.modules");
    assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
    assert!(config.dependency_check);
    assert!(config.dispatch_events);
    assert!(!config.scan_composer_packages);
    assert!(config.discovery.routes && config.discovery.repositories);
    assert_eq!(config.views.namespace_format, NamespaceFormat::Lower);
    assert_eq!(config.manifest_file(), PathBuf::from("storage/app/modules.json"));
}

#[test]
fn test_partial_json_keeps_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("modules.json");
    fs::write(
        &path,
        r#"{
            "path": "packages",
            "aliases": { "store": "Shop" },
            "cache": true,
            "discovery": { "routes": false },
            "views": { "namespace_format": "studly" },
            "manifest_path": "var/modules.json"
        }"#,
    )
    .unwrap();

    let config = ModulesConfig::from_file(&LocalStorageProvider::default(), &path)
        .unwrap()
        .resolve_against(Path::new("/srv/app"));

    assert_eq!(config.path, PathBuf::from("/srv/app/packages"));
    assert_eq!(config.aliases.get("store").map(String::as_str), Some("Shop"));
    assert!(config.cache);
    assert!(!config.discovery.routes);
    assert!(config.discovery.views);
    assert_eq!(config.views.namespace_format, NamespaceFormat::Studly);
    assert_eq!(config.manifest_file(), PathBuf::from("/srv/app/var/modules.json"));
    assert_eq!(config.storage_path, PathBuf::from("/srv/app/storage/app"));
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_yaml_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("modules.yaml");
    fs::write(&path, "namespace: App\\Modules\ndefault_priority: 5\n").unwrap();

    let config = ModulesConfig::from_file(&LocalStorageProvider::default(), &path).unwrap();

    assert_eq!(config.namespace, "App\\Modules");
    assert_eq!(config.default_priority, 5);
}

#[test]
fn test_invalid_config_is_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("modules.json");
    fs::write(&path, r#"{ "default_priority": "high" }"#).unwrap();

    let result = ModulesConfig::from_file(&LocalStorageProvider::default(), &path);

    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn test_middleware_groups() {
    let mut config = ModulesConfig::default();
    config.middleware_groups.insert("admin".into(), vec!["web".into(), "auth".into()]);

    assert_eq!(config.middleware_for("admin"), vec!["web", "auth"]);
    assert_eq!(config.middleware_for("web"), vec!["web"]);
    assert_eq!(config.middleware_for("api"), vec!["api"]);
    assert!(config.middleware_for("channels").is_empty());
}

#[test]
fn test_namespace_formats() {
    assert_eq!(NamespaceFormat::Lower.apply("BlogPosts"), "blogposts");
    assert_eq!(NamespaceFormat::Studly.apply("BlogPosts"), "BlogPosts");
    assert_eq!(NamespaceFormat::Camel.apply("BlogPosts"), "blogPosts");
}
