//! NIF file writing

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::NifFile;
use super::header;
use crate::error::{Error, Result};

/// Write a NIF file to disk.
///
/// # Errors
/// Returns an error if the file cannot be created or written, or a string
/// no longer fits its length prefix.
pub fn write_nif<P: AsRef<Path>>(path: P, nif: &NifFile) -> Result<()> {
    let path = path.as_ref();
    tracing::debug!("Writing NIF: {}", path.display());

    let bytes = serialize_nif(nif)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Serialize a NIF file to bytes.
///
/// Block sizes in the header are recomputed from the encoded blocks.
///
/// # Errors
/// Returns an error if a string or block no longer fits its length prefix.
pub fn serialize_nif(nif: &NifFile) -> Result<Vec<u8>> {
    let payloads = nif
        .blocks
        .iter()
        .map(super::Block::encode)
        .collect::<Result<Vec<_>>>()?;

    let sizes = payloads
        .iter()
        .map(|payload| {
            u32::try_from(payload.len()).map_err(|_| Error::StringTooLong {
                len: payload.len(),
                max: u32::MAX as usize,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut output = Vec::new();
    header::write_header(&mut output, &nif.header, &sizes)?;
    for payload in &payloads {
        output.extend_from_slice(payload);
    }

    output.write_u32::<LittleEndian>(nif.roots.len() as u32)?;
    for &root in &nif.roots {
        output.write_i32::<LittleEndian>(root)?;
    }

    Ok(output)
}
