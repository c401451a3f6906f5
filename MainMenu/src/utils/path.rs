//! Path utilities

use std::path::Path;

/// Normalize path separators to forward slashes (for zip entry names)
pub fn normalize_path<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Get relative path and normalize separators
pub fn relative_path<P: AsRef<Path>>(path: P, base: P) -> Option<String> {
    path.as_ref()
        .strip_prefix(base.as_ref())
        .ok()
        .map(normalize_path)
}

/// Last component of a path that may use either separator.
///
/// Paths stored inside game files are usually Windows-style, so `Path`
/// alone would not split them on Unix.
pub fn file_name_any_separator(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
