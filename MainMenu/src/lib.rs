//! # MainMenu
//!
//! Turns a main menu background mod into a named, self-contained mod archive.
//!
//! A background mod replaces the game's `logo.nif` (or `logo01ae.nif`) mesh
//! and its texture. This crate extracts such a mod, retargets the mesh at
//! `Interface/MainMenu/<name>.dds`, moves mesh and texture into
//! `Interface/MainMenu`, and zips the result as `<name>.zip`, so several
//! backgrounds can be installed side by side.
//!
//! ## Quick Start
//!
//! ### Converting a Mod
//!
//! ```no_run
//! use mainmenu::prelude::*;
//!
//! let options = ConvertOptions::new("Skyrim Dawn", "converted/")
//!     .with_tools(ArchiveTools::locate(None)?);
//! let report = convert_mod("SkyrimDawn.zip", &options, |_| {})?;
//! println!("Wrote {}", report.output.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Editing a Mesh Directly
//!
//! ```no_run
//! use mainmenu::formats::nif::NifFile;
//!
//! let mut nif = NifFile::load("logo.nif")?;
//! let shapes: Vec<_> = nif.shapes().collect();
//! for shape in shapes {
//!     println!("{:?}", nif.texture_slot(shape, 0));
//!     nif.set_texture_slot(shape, 0, "Interface/MainMenu/Dawn.dds");
//! }
//! nif.save("Dawn.nif")?;
//! # Ok::<(), mainmenu::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `mainmenu` command-line binary

pub mod archive;
pub mod config;
pub mod convert;
pub mod error;
pub mod formats;
pub mod utils;

#[cfg(feature = "cli")]
pub mod cli;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::archive::{ArchiveFormat, ArchiveTools};
    pub use crate::config::Settings;
    pub use crate::convert::{
        ConversionReport, ConvertError, ConvertOptions, ConvertStep, ErrorKind, convert_mod,
        patch_textures,
    };
    pub use crate::error::{Error, Result};
    pub use crate::formats::nif::{NifFile, ShapeRef};
    pub use crate::utils::find_file;
}

/// Version of the `MainMenu` library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
