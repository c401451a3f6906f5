//! Error types for `MainMenu`

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// The error type for low-level `MainMenu` operations (NIF and archive handling).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    // ==================== Archive Errors ====================
    /// ZIP reading or writing failed.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// 7z extraction failed.
    #[error("7z error: {message}")]
    SevenZip {
        /// The error message from the 7z backend.
        message: String,
    },

    /// The archive format is not handled by any available backend.
    #[error("unsupported archive format: {path}")]
    UnsupportedArchiveFormat {
        /// The archive that could not be handled.
        path: PathBuf,
    },

    /// The archive needs the external 7-Zip program but none is configured.
    #[error("7-Zip is required to extract {path} but was not found; install 7-Zip or pass --seven-zip")]
    SevenZipNotFound {
        /// The archive that needed 7-Zip.
        path: PathBuf,
    },

    /// A configured 7-Zip executable does not exist.
    #[error("7-Zip executable not found at {path}")]
    SevenZipMissing {
        /// The configured executable path.
        path: PathBuf,
    },

    /// The external 7-Zip program exited unsuccessfully.
    #[error("7-Zip exited with {status}: {stderr}")]
    SevenZipFailed {
        /// Exit status of the 7-Zip process.
        status: ExitStatus,
        /// Captured standard error output.
        stderr: String,
    },

    // ==================== NIF Format Errors ====================
    /// The header line is not a Gamebryo/NetImmerse header.
    #[error("invalid NIF header: {0}")]
    InvalidNifHeader(String),

    /// The NIF version is not supported.
    #[error("unsupported NIF version: {version} (supported: 20.2.0.7)")]
    UnsupportedNifVersion {
        /// The version string found in the file.
        version: String,
    },

    /// Big-endian NIF data is not supported.
    #[error("big-endian NIF files are not supported")]
    UnsupportedNifEndian,

    /// A block references a block type that is not in the header.
    #[error("block {block} has invalid type index {index}")]
    InvalidBlockTypeIndex {
        /// The block index.
        block: usize,
        /// The type index found.
        index: u16,
    },

    /// A block reference points outside the block list.
    #[error("block {block} references missing block {target}")]
    InvalidBlockRef {
        /// The referencing block.
        block: usize,
        /// The reference value found.
        target: i32,
    },

    /// A block's contents do not match its declared type or size.
    #[error("malformed {block_type} block {block}: {message}")]
    MalformedBlock {
        /// The block index.
        block: usize,
        /// The block type name.
        block_type: String,
        /// What is wrong with it.
        message: String,
    },

    /// A string is too long for its length prefix.
    #[error("string of {len} bytes exceeds the {max} byte limit")]
    StringTooLong {
        /// The string length.
        len: usize,
        /// The maximum length the prefix can hold.
        max: usize,
    },
}

/// A specialized Result type for `MainMenu` operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<sevenz_rust::Error> for Error {
    fn from(err: sevenz_rust::Error) -> Self {
        Error::SevenZip {
            message: err.to_string(),
        }
    }
}
