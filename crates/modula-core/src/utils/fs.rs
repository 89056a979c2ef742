use std::path::{Component, Path, PathBuf};

use crate::kernel::error::Result;
use crate::storage::StorageProvider;

/// List the files directly inside `dir` whose extension matches `extension`
/// (case-insensitive), sorted by name.
///
/// A missing directory yields an empty list.
pub fn files_with_extension(
    provider: &dyn StorageProvider,
    dir: &Path,
    extension: &str,
) -> Result<Vec<PathBuf>> {
    if !provider.is_dir(dir) {
        return Ok(Vec::new());
    }
    let wanted = extension.to_lowercase();
    Ok(provider
        .read_dir(dir)?
        .into_iter()
        .filter(|path| provider.is_file(path))
        .filter(|path| {
            path.extension()
                .map(|ext| ext.to_string_lossy().to_lowercase() == wanted)
                .unwrap_or(false)
        })
        .collect())
}

/// File name without its extension, as an owned string
pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

/// Fully-qualified class name for a file under a module root.
///
/// `relative` is the path inside the module (e.g. `app/Models/Post.php`); a
/// leading `app` segment is dropped, the extension is removed and the
/// remaining segments are joined with `\` under `namespace`.
pub fn class_name(namespace: &str, relative: &Path) -> String {
    let mut segments: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if segments.first().map(String::as_str) == Some("app") {
        segments.remove(0);
    }
    let namespace = namespace.trim_end_matches('\\');
    if namespace.is_empty() {
        segments.join("\\")
    } else {
        format!("{}\\{}", namespace, segments.join("\\"))
    }
}
