use std::path::Path;

use crate::host::{Host, InMemoryHost};
use crate::storage::ConfigData;

#[test]
fn test_config_merge_keeps_existing_values() {
    let (host, recorder) = Host::in_memory();

    let mut existing = ConfigData::new();
    existing.set("title", "Configured").unwrap();
    host.config.merge("blog", existing).unwrap();

    let mut defaults = ConfigData::new();
    defaults.set("title", "Default").unwrap();
    defaults.set("per_page", 10).unwrap();
    host.config.merge("blog", defaults).unwrap();

    let merged = recorder.config("blog").unwrap();
    assert_eq!(merged.get::<String>("title").unwrap(), "Configured");
    assert_eq!(merged.get::<i64>("per_page"), Some(10));
}

#[test]
fn test_rejected_items_fail_and_are_not_recorded() {
    let (host, recorder) = Host::in_memory();
    recorder.reject("Modules\\Blog\\Providers\\Broken");

    assert!(host.container.register("Modules\\Blog\\Providers\\Broken").is_err());
    host.container.register("Modules\\Blog\\Providers\\BlogServiceProvider").unwrap();

    assert_eq!(recorder.providers(), vec!["Modules\\Blog\\Providers\\BlogServiceProvider".to_string()]);
}

#[test]
fn test_migration_paths_are_tracked() {
    let recorder = InMemoryHost::new();
    let host = Host::from_memory(std::sync::Arc::new(recorder));
    let path = Path::new("/app/Modules/Blog/database/migrations");

    assert!(!host.migrations.has_path(path));
    host.migrations.add_path(path).unwrap();
    assert!(host.migrations.has_path(path));
}
