//! Persisted defaults
//!
//! Read from `<config dir>/MainMenu/config.json`, for example:
//!
//! ```json
//! {
//!   "output_dir": "~/Desktop",
//!   "seven_zip": "C:\\Program Files\\7-Zip\\7z.exe",
//!   "pause_on_error": false
//! }
//! ```
//!
//! Every field is optional. Command-line flags take precedence.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Settings file contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where output archives go
    pub output_dir: Option<PathBuf>,
    /// 7-Zip executable for formats without a compiled-in backend
    pub seven_zip: Option<PathBuf>,
    /// Parent folder of the scratch workspace
    pub temp_dir: Option<PathBuf>,
    /// Wait for a key press after printing an error
    pub pause_on_error: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: None,
            seven_zip: None,
            temp_dir: None,
            pause_on_error: true,
        }
    }
}

impl Settings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("MainMenu").join("config.json"))
    }

    /// Load settings.
    ///
    /// With an explicit path the file must exist and parse. Without one the
    /// default file is optional, and a broken one is logged and ignored.
    ///
    /// # Errors
    /// Returns an error if an explicit settings file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };
        if !path.is_file() {
            return Ok(Self::default());
        }
        match Self::load_from(&path) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!("Ignoring settings file: {e:#}");
                Ok(Self::default())
            }
        }
    }

    /// Load settings from a specific file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid settings JSON.
    pub fn load_from<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let mut settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;

        settings.output_dir = settings.output_dir.map(expand_tilde);
        settings.seven_zip = settings.seven_zip.map(expand_tilde);
        settings.temp_dir = settings.temp_dir.map(expand_tilde);
        tracing::debug!("Loaded settings from {}: {settings:?}", path.display());
        Ok(settings)
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_tilde(path: PathBuf) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path
}
