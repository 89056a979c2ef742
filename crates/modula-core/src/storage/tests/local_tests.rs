use std::path::PathBuf;
use std::fs;
use tempfile::tempdir;

use crate::kernel::error::Result;
use crate::storage::provider::StorageProvider;
use crate::storage::local::LocalStorageProvider;

// Helper function to create PathBuf from str for tests
fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}

#[test]
fn test_write_and_read_string() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.write_string(&p("test.json"), "{\"a\": 1}")?;

    assert_eq!(provider.read_to_string(&p("test.json"))?, "{\"a\": 1}");
    Ok(())
}

#[test]
fn test_write_creates_parent_directories() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.write_string(&p("storage/app/modules.json"), "{}")?;

    assert!(temp_dir.path().join("storage/app/modules.json").is_file());
    Ok(())
}

#[test]
fn test_write_replaces_existing_file_without_leftovers() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.write_string(&p("state.json"), "first")?;
    provider.write_string(&p("state.json"), "second")?;

    assert_eq!(provider.read_to_string(&p("state.json"))?, "second");
    // The temporary file used for the atomic swap must not remain
    let entries = provider.read_dir(&p(""))?;
    assert_eq!(entries, vec![p("state.json")]);
    Ok(())
}

#[test]
fn test_absolute_paths_ignore_base() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::default();
    let target = temp_dir.path().join("abs.txt");

    provider.write_string(&target, "absolute")?;

    assert!(provider.is_file(&target));
    assert_eq!(fs::read_to_string(&target).unwrap(), "absolute");
    Ok(())
}

#[test]
fn test_read_dir_is_sorted_and_joined() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let root = temp_dir.path().to_path_buf();
    fs::create_dir_all(root.join("Modules/Shop")).unwrap();
    fs::create_dir_all(root.join("Modules/Blog")).unwrap();
    fs::write(root.join("Modules/readme.md"), "x").unwrap();

    let provider = LocalStorageProvider::default();
    let entries = provider.read_dir(&root.join("Modules"))?;

    assert_eq!(
        entries,
        vec![
            root.join("Modules/Blog"),
            root.join("Modules/Shop"),
            root.join("Modules/readme.md"),
        ]
    );
    Ok(())
}

#[test]
fn test_read_dir_missing_directory_is_an_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    assert!(provider.read_dir(&p("nope")).is_err());
}

#[test]
fn test_remove_file() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.write_string(&p("gone.txt"), "data")?;
    assert!(provider.exists(&p("gone.txt")));

    provider.remove_file(&p("gone.txt"))?;
    assert!(!provider.exists(&p("gone.txt")));
    Ok(())
}
