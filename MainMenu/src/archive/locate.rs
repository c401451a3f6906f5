//! Finding the external 7-Zip executable

use std::env;
use std::path::{Path, PathBuf};

/// Executable names tried in each candidate directory.
#[cfg(windows)]
const EXECUTABLE_NAMES: &[&str] = &["7z.exe", "7za.exe"];
#[cfg(not(windows))]
const EXECUTABLE_NAMES: &[&str] = &["7z", "7zz", "7za"];

#[cfg(windows)]
const WELL_KNOWN_PATHS: &[&str] = &[
    r"C:\Program Files\7-Zip\7z.exe",
    r"C:\Program Files (x86)\7-Zip\7z.exe",
];
#[cfg(not(windows))]
const WELL_KNOWN_PATHS: &[&str] = &[
    "/usr/bin/7z",
    "/usr/local/bin/7z",
    "/opt/homebrew/bin/7z",
    "/usr/bin/7zz",
    "/usr/local/bin/7zz",
    "/opt/homebrew/bin/7zz",
];

/// Look for 7-Zip next to the running executable, then at well-known install
/// locations, then on `PATH`.
pub(crate) fn find_seven_zip() -> Option<PathBuf> {
    let beside_exe = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    if let Some(found) = beside_exe.as_deref().and_then(find_in_dir) {
        tracing::debug!("Found 7-Zip next to executable: {}", found.display());
        return Some(found);
    }

    if let Some(found) = WELL_KNOWN_PATHS.iter().map(PathBuf::from).find(|p| p.is_file()) {
        tracing::debug!("Found 7-Zip at {}", found.display());
        return Some(found);
    }

    let found = env::var_os("PATH")
        .and_then(|paths| env::split_paths(&paths).find_map(|dir| find_in_dir(&dir)));
    match &found {
        Some(path) => tracing::debug!("Found 7-Zip on PATH: {}", path.display()),
        None => tracing::debug!("No 7-Zip executable found"),
    }
    found
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    EXECUTABLE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}
