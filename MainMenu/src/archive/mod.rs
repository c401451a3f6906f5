//! Mod archive extraction and zip output
//!
//! Zip and 7z archives are handled by compiled-in backends. RAR and anything
//! unrecognised are passed to an external 7-Zip executable, which is located
//! once at startup and carried around in [`ArchiveTools`].

mod compress;
mod extract;
mod format;
mod locate;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub use format::ArchiveFormat;

/// Archive backends available to this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveTools {
    seven_zip: Option<PathBuf>,
}

impl ArchiveTools {
    /// Compiled-in backends only, no external 7-Zip.
    #[must_use]
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Use the given 7-Zip executable for formats without a compiled-in backend.
    #[must_use]
    pub fn with_seven_zip<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            seven_zip: Some(path.into()),
        }
    }

    /// Build the tool set for this run.
    ///
    /// An explicit 7-Zip path must point at an existing file. Without one,
    /// 7-Zip is searched for next to the running executable, then at
    /// well-known install locations. Not finding it is fine; only formats
    /// without a compiled-in backend need it.
    ///
    /// # Errors
    /// Returns [`Error::SevenZipMissing`] if `explicit` does not exist.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(Error::SevenZipMissing {
                    path: path.to_path_buf(),
                });
            }
            return Ok(Self::with_seven_zip(path));
        }

        Ok(Self {
            seven_zip: locate::find_seven_zip(),
        })
    }

    /// The external 7-Zip executable, if any.
    #[must_use]
    pub fn seven_zip(&self) -> Option<&Path> {
        self.seven_zip.as_deref()
    }

    /// Extract the whole archive into `dest`, creating it if needed.
    ///
    /// Returns the number of regular files extracted. Files already written
    /// are left in place on failure.
    ///
    /// # Errors
    /// Returns an error if the archive is missing, unreadable, corrupt, or
    /// needs 7-Zip ([`Error::SevenZipNotFound`]) when none is configured.
    /// Input that 7-Zip cannot open is [`Error::UnsupportedArchiveFormat`].
    pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(&self, archive: P, dest: Q) -> Result<usize> {
        let archive = archive.as_ref();
        let dest = dest.as_ref();

        let format = ArchiveFormat::detect(archive)?;
        tracing::info!("Extracting {} ({format:?}) to {}", archive.display(), dest.display());
        fs::create_dir_all(dest)?;

        let count = match format {
            ArchiveFormat::Zip => extract::extract_zip(archive, dest)?,
            ArchiveFormat::SevenZip => extract::extract_7z(archive, dest)?,
            ArchiveFormat::Rar | ArchiveFormat::Unknown => {
                let seven_zip = self.seven_zip().ok_or_else(|| Error::SevenZipNotFound {
                    path: archive.to_path_buf(),
                })?;
                extract::extract_external(seven_zip, archive, dest)?
            }
        };

        tracing::info!("Extracted {count} files");
        Ok(count)
    }

    /// Zip the contents of `source_dir` into `dest`, replacing any existing file.
    ///
    /// Entry names are relative to `source_dir` with `/` separators, and
    /// file data is deflated. Returns the number of files written.
    ///
    /// # Errors
    /// Returns an error on any I/O or zip failure.
    pub fn compress_dir<P: AsRef<Path>, Q: AsRef<Path>>(&self, source_dir: P, dest: Q) -> Result<usize> {
        compress::compress_dir(source_dir.as_ref(), dest.as_ref())
    }
}
