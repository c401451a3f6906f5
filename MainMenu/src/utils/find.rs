//! Case-insensitive file and folder lookup

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Find the first regular file under `root` named `name`, ignoring case.
///
/// Directories are walked depth-first with entries sorted by file name, so
/// the result is stable across runs.
///
/// # Errors
///
/// Returns an error if `root` does not exist or a directory cannot be read.
/// A tree with no matching file is `Ok(None)`.
pub fn find_file<P: AsRef<Path>>(root: P, name: &str) -> Result<Option<PathBuf>> {
    let root = root.as_ref();
    let wanted = name.to_lowercase();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().to_lowercase() == wanted {
            tracing::debug!("Found {name} at {}", entry.path().display());
            return Ok(Some(entry.into_path()));
        }
    }

    tracing::debug!("No file named {name} under {}", root.display());
    Ok(None)
}

/// Join `components` onto `base`, reusing existing folders whose names match
/// ignoring case.
///
/// A component with no existing match, and everything after it, is joined as
/// given. Nothing is created. When several folders match, the first in
/// byte order wins, so an exact-case `Data` beats `data`.
///
/// # Errors
///
/// Returns an error if an existing folder on the way cannot be read.
pub fn resolve_dir<P: AsRef<Path>>(base: P, components: &[&str]) -> Result<PathBuf> {
    let mut current = base.as_ref().to_path_buf();
    for component in components {
        current = match existing_dir(&current, component)? {
            Some(dir) => dir,
            None => current.join(component),
        };
    }
    Ok(current)
}

fn existing_dir(parent: &Path, name: &str) -> Result<Option<PathBuf>> {
    if !parent.is_dir() {
        return Ok(None);
    }
    let wanted = name.to_lowercase();
    for entry in WalkDir::new(parent).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() && entry.file_name().to_string_lossy().to_lowercase() == wanted {
            return Ok(Some(entry.into_path()));
        }
    }
    Ok(None)
}
