use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tempfile::tempdir;

use crate::event::{sync_typed_handler, EventResult, ModuleEvent};
use crate::host::Host;
use crate::kernel::bootstrap::Application;
use crate::kernel::error::{Error, KernelLifecyclePhase};
use crate::module_system::{LoadStatus, Module, ModuleManager, ModulesConfig};

fn module(app: &Path, name: &str, priority: i64) {
    let dir = app.join("Modules").join(name);
    fs::create_dir_all(dir.join("app/Providers")).unwrap();
    fs::write(
        dir.join("module.json"),
        format!(r#"{{ "name": "{}", "priority": {} }}"#, name, priority),
    )
    .unwrap();
    fs::write(dir.join(format!("app/Providers/{}ServiceProvider.php", name)), "<?php").unwrap();
}

#[tokio::test]
async fn test_boot_loads_enabled_modules_by_priority() {
    let app = tempdir().unwrap();
    module(app.path(), "Blog", 10);
    module(app.path(), "Core", 90);
    module(app.path(), "Shop", 50);
    let (host, recorder) = Host::in_memory();
    let application = Application::new(ModulesConfig::default().resolve_against(app.path()), host);
    application.manager().disable("Shop").await.unwrap();

    let reports = application.boot().await.unwrap();

    assert!(application.is_booted());
    let loaded: Vec<&str> = reports.iter().map(|r| r.module()).collect();
    assert_eq!(loaded, vec!["Core", "Blog"]);
    assert!(reports.iter().all(|r| r.status() == &LoadStatus::Loaded));
    assert_eq!(
        recorder.providers(),
        vec!["Modules\\Core\\Providers\\CoreServiceProvider", "Modules\\Blog\\Providers\\BlogServiceProvider"]
    );
}

#[tokio::test]
async fn test_boot_runs_once() {
    let app = tempdir().unwrap();
    module(app.path(), "Blog", 10);
    let application = Application::new(ModulesConfig::default().resolve_against(app.path()), Host::in_memory().0);

    application.boot().await.unwrap();
    let second = application.boot().await;

    assert!(matches!(
        second,
        Err(Error::KernelLifecycleError { phase: KernelLifecyclePhase::Boot, .. })
    ));
}

#[tokio::test]
async fn test_boot_dispatches_lifecycle_events() {
    let app = tempdir().unwrap();
    module(app.path(), "Blog", 10);
    module(app.path(), "Shop", 5);
    let application = Application::new(ModulesConfig::default().resolve_against(app.path()), Host::in_memory().0);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    application
        .event_dispatcher()
        .register_type_handler::<ModuleEvent>(sync_typed_handler(move |event: &ModuleEvent| {
            seen_clone.lock().unwrap().push(event.clone());
            EventResult::Continue
        }))
        .await
        .unwrap();

    application.boot().await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ModuleEvent::Discovered { count: 2 },
            ModuleEvent::Loaded { name: "Blog".into() },
            ModuleEvent::Loaded { name: "Shop".into() },
            ModuleEvent::Booted { count: 2 },
        ]
    );
}

#[tokio::test]
async fn test_from_root_reads_config_file() {
    let app = tempdir().unwrap();
    let dir = app.path().join("packages").join("Blog");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("module.json"), r#"{ "name": "Blog" }"#).unwrap();
    fs::write(
        app.path().join("modules.toml"),
        "path = \"packages\"\nnamespace = \"Acme\"\n\n[aliases]\nposts = \"Blog\"\n",
    )
    .unwrap();

    let application = Application::from_root(app.path(), Some(Path::new("modules.toml")), Host::in_memory().0).unwrap();

    assert_eq!(application.config().path, app.path().join("packages"));
    let blog = application.manager().find_or_fail("posts").await.unwrap();
    assert_eq!(blog.namespace(), "Acme\\Blog");
}

#[test]
fn test_missing_config_file_is_an_error() {
    let app = tempdir().unwrap();

    let result = Application::from_root(app.path(), Some(Path::new("absent.json")), Host::in_memory().0);

    assert!(matches!(result, Err(Error::Config { .. })));
}
