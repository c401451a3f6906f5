//! User-facing conversion errors

use std::path::PathBuf;

use thiserror::Error;

use crate::error::Error;

/// What went wrong, without the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingArgument,
    MissingDependency,
    InvalidIdentifier,
    Prompt,
    ExtractionFailed,
    AssetNotFound,
    MeshLoadFailed,
    MeshSaveFailed,
    TextureNotFound,
    RepackageFailed,
    Filesystem,
}

/// A failed conversion. The first failure ends the run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConvertError {
    /// No mod archive was given on the command line.
    #[error("No mod specified. Pass the path of a mod archive.")]
    MissingArgument,

    /// The archive backend needed for this run is unavailable.
    #[error("Could not find 7-Zip. Install 7-Zip or pass its path with --seven-zip.")]
    MissingDependency {
        #[source]
        source: Error,
    },

    /// The mod name cannot be used as a file name.
    #[error("Invalid name {identifier:?}: {reason}")]
    InvalidIdentifier {
        identifier: String,
        reason: &'static str,
    },

    /// Reading the mod name from standard input failed.
    #[error("Unable to read the mod name")]
    Prompt {
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to extract mod archive: {}", .archive.display())]
    ExtractionFailed {
        archive: PathBuf,
        #[source]
        source: Error,
    },

    /// Neither `logo.nif` nor `logo01ae.nif` is in the archive.
    #[error("Unable to find main menu mesh (logo.nif or logo01ae.nif) in {}", .archive.display())]
    AssetNotFound { archive: PathBuf },

    #[error("Unable to load {}. Is it a valid nif file?", .path.display())]
    MeshLoadFailed {
        path: PathBuf,
        #[source]
        source: Error,
    },

    #[error("Unable to save mesh to path: {}", .path.display())]
    MeshSaveFailed {
        path: PathBuf,
        #[source]
        source: Error,
    },

    /// The mesh has no diffuse texture, or its file is not in the archive.
    #[error(
        "Unable to find old texture file {}",
        .texture.as_deref().unwrap_or("(the mesh has no diffuse texture)")
    )]
    TextureNotFound { texture: Option<String> },

    #[error("Unable to zip up mod contents into {}", .output.display())]
    RepackageFailed {
        output: PathBuf,
        #[source]
        source: Error,
    },

    /// Creating the workspace, a folder, or a copy failed.
    #[error("Filesystem error at {}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: Error,
    },
}

impl ConvertError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingArgument => ErrorKind::MissingArgument,
            Self::MissingDependency { .. } => ErrorKind::MissingDependency,
            Self::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            Self::Prompt { .. } => ErrorKind::Prompt,
            Self::ExtractionFailed { .. } => ErrorKind::ExtractionFailed,
            Self::AssetNotFound { .. } => ErrorKind::AssetNotFound,
            Self::MeshLoadFailed { .. } => ErrorKind::MeshLoadFailed,
            Self::MeshSaveFailed { .. } => ErrorKind::MeshSaveFailed,
            Self::TextureNotFound { .. } => ErrorKind::TextureNotFound,
            Self::RepackageFailed { .. } => ErrorKind::RepackageFailed,
            Self::Filesystem { .. } => ErrorKind::Filesystem,
        }
    }

    /// Process exit status for this error. Every kind is fatal.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        1
    }

    pub(crate) fn filesystem<P: Into<PathBuf>, E: Into<Error>>(path: P, source: E) -> Self {
        Self::Filesystem {
            path: path.into(),
            source: source.into(),
        }
    }
}
