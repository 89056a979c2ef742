use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::kernel::error::Result;

/// Filesystem access used by discovery, the manifest store, the file cache
/// and the component loader.
///
/// Probing methods (`exists`, `is_file`, `is_dir`) never fail; an
/// inaccessible path simply reports `false`.
pub trait StorageProvider: Send + Sync + Debug {
    /// Short identifier, used in log lines
    fn name(&self) -> &str;

    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace the file at `path` with `contents`. Readers see either the old
    /// or the new contents, never a partial write.
    fn write_string(&self, path: &Path, contents: &str) -> Result<()>;

    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Entries of a directory sorted by file name, each returned as `path`
    /// joined with the entry name
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}
