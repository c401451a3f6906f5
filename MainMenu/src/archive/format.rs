//! Archive format detection

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;

const ZIP_SIGNATURES: [&[u8]; 3] = [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];
const SEVEN_ZIP_SIGNATURE: &[u8] = b"7z\xBC\xAF\x27\x1C";
const RAR_SIGNATURE: &[u8] = b"Rar!\x1A\x07";

/// Container format of a mod archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    SevenZip,
    Rar,
    /// Anything else; left to the external 7-Zip program
    Unknown,
}

impl ArchiveFormat {
    /// Detect the format from the leading signature bytes, falling back to
    /// the file extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub fn detect<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut magic = Vec::with_capacity(8);
        File::open(path)?.take(8).read_to_end(&mut magic)?;

        let format = Self::from_signature(&magic);
        if format != Self::Unknown {
            return Ok(format);
        }
        Ok(Self::from_extension(path))
    }

    /// Match leading bytes against known signatures.
    #[must_use]
    pub fn from_signature(magic: &[u8]) -> Self {
        if ZIP_SIGNATURES.iter().any(|sig| magic.starts_with(sig)) {
            Self::Zip
        } else if magic.starts_with(SEVEN_ZIP_SIGNATURE) {
            Self::SevenZip
        } else if magic.starts_with(RAR_SIGNATURE) {
            Self::Rar
        } else {
            Self::Unknown
        }
    }

    /// Guess the format from the file extension.
    #[must_use]
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "zip" => Self::Zip,
            "7z" => Self::SevenZip,
            "rar" => Self::Rar,
            _ => Self::Unknown,
        }
    }
}
