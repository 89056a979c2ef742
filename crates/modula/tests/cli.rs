use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{TempDir, tempdir};

fn module(app: &Path, name: &str, priority: i64, requires: &[&str]) {
    let dir = app.join("Modules").join(name);
    fs::create_dir_all(dir.join("app/Providers")).unwrap();
    let requires: Vec<String> = requires.iter().map(|r| format!("\"{}\"", r)).collect();
    fs::write(
        dir.join("module.json"),
        format!(
            r#"{{ "name": "{}", "priority": {}, "requires": [{}] }}"#,
            name,
            priority,
            requires.join(", ")
        ),
    )
    .unwrap();
    fs::write(dir.join(format!("app/Providers/{}ServiceProvider.php", name)), "<?php").unwrap();
}

/// Blog and Shop, Shop requiring Blog
fn blog_and_shop() -> TempDir {
    let app = tempdir().unwrap();
    module(app.path(), "Blog", 10, &[]);
    module(app.path(), "Shop", 5, &["Blog"]);
    app
}

fn modula(app: &Path) -> Command {
    let mut cmd = Command::cargo_bin("modula").unwrap();
    cmd.arg("--root").arg(app).env_remove("RUST_LOG").env_remove("MODULA_LOG");
    cmd
}

#[test]
fn test_list_shows_modules_by_priority() -> Result<(), Box<dyn std::error::Error>> {
    let app = blog_and_shop();

    modula(app.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)Blog\s+enabled.*Shop\s+enabled")?);

    Ok(())
}

#[test]
fn test_list_without_modules() {
    let app = tempdir().unwrap();

    modula(app.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No modules found."));
}

#[test]
fn test_disable_persists_between_runs() {
    let app = blog_and_shop();

    modula(app.path())
        .args(["disable", "shop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Module 'Shop' disabled."));

    assert!(app.path().join("storage/app/modules.json").is_file());

    modula(app.path())
        .args(["list", "--disabled"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shop").and(predicate::str::contains("Blog").not()));
}

#[test]
fn test_enable_with_disabled_dependency_fails() {
    let app = blog_and_shop();
    modula(app.path()).args(["disable", "Shop"]).assert().success();
    modula(app.path()).args(["disable", "Blog"]).assert().success();

    modula(app.path())
        .args(["enable", "Shop"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unsatisfied dependencies: Blog"));

    modula(app.path()).args(["enable", "Blog"]).assert().success();
    modula(app.path()).args(["enable", "Shop"]).assert().success();
}

#[test]
fn test_unknown_module_fails() {
    let app = blog_and_shop();

    modula(app.path())
        .args(["show", "Ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Module 'Ghost' not found"));
}

#[test]
fn test_show_and_deps() {
    let app = blog_and_shop();

    modula(app.path())
        .args(["show", "Shop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("namespace:   Modules\\Shop"))
        .stdout(predicate::str::contains("requires:    Blog"));

    modula(app.path())
        .args(["deps", "Blog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dependents: Shop"));
}

#[test]
fn test_graph_prints_load_order() {
    let app = blog_and_shop();
    module(app.path(), "Analytics", 1, &["Shop"]);

    modula(app.path())
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shop -> Blog"))
        .stdout(predicate::str::contains("Load order: Blog, Shop, Analytics"));
}

#[test]
fn test_cache_and_clear() {
    let app = blog_and_shop();

    modula(app.path())
        .arg("cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cached 2 module(s)."));

    modula(app.path())
        .arg("cache-clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("Module cache cleared."));
}

#[test]
fn test_boot_reports_loaded_modules() {
    let app = blog_and_shop();
    modula(app.path()).args(["disable", "Shop"]).assert().success();

    modula(app.path())
        .arg("boot")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blog: loaded"))
        .stdout(predicate::str::contains("providers: Modules\\Blog\\Providers\\BlogServiceProvider"))
        .stdout(predicate::str::contains("Shop").not());
}

#[test]
fn test_config_file_and_path_override() {
    let app = tempdir().unwrap();
    let dir = app.path().join("packages").join("Forum");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("module.json"), r#"{ "name": "Forum" }"#).unwrap();
    fs::write(app.path().join("modules.json"), r#"{ "aliases": { "board": "Forum" } }"#).unwrap();

    modula(app.path())
        .args(["--config", "modules.json", "--path", "packages", "show", "board"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Forum\n"));
}

#[test]
fn test_missing_subcommand_is_usage_error() {
    Command::cargo_bin("modula")
        .unwrap()
        .assert()
        .failure()
        .code(2);
}
