//! NIF header reading and writing

use std::borrow::Cow;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::blocks::{read_sized_string, write_sized_string};
use super::{BS_HEADER_MIN_USER_VERSION, BS_VERSION_FALLOUT_4, NIF_VERSION_20_2_0_7};
use crate::error::{Error, Result};

/// Accepted prefixes of the ASCII header line.
const HEADER_PREFIXES: [&[u8]; 2] = [b"Gamebryo File Format", b"NetImmerse File Format"];

/// Longest header line accepted before giving up on finding the newline.
const MAX_HEADER_LINE: usize = 128;

/// The NIF file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NifHeader {
    /// Header line without the trailing newline
    pub(crate) header_line: Vec<u8>,
    pub(crate) version: u32,
    pub(crate) user_version: u32,
    pub(crate) bs_header: Option<BsStreamHeader>,
    pub(crate) block_types: Vec<String>,
    pub(crate) block_type_indices: Vec<u16>,
    pub(crate) max_string_length: u32,
    pub(crate) strings: Vec<Vec<u8>>,
    pub(crate) groups: Vec<u32>,
}

/// Bethesda's extension of the NIF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsStreamHeader {
    pub(crate) version: u32,
    pub(crate) author: Vec<u8>,
    pub(crate) unknown: Option<u32>,
    pub(crate) process_script: Option<Vec<u8>>,
    pub(crate) export_script: Vec<u8>,
    pub(crate) max_filepath: Option<Vec<u8>>,
}

impl BsStreamHeader {
    /// Bethesda stream version (83 = Skyrim LE, 100 = Skyrim SE, 130 = Fallout 4).
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Exporter author, without the null terminator.
    #[must_use]
    pub fn author(&self) -> Cow<'_, str> {
        export_string_text(&self.author)
    }
}

impl NifHeader {
    /// File version word (`0x14020007` for 20.2.0.7).
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// File version in dotted form, e.g. `20.2.0.7`.
    #[must_use]
    pub fn version_string(&self) -> String {
        format_version(self.version)
    }

    #[must_use]
    pub fn user_version(&self) -> u32 {
        self.user_version
    }

    /// Bethesda stream header, if present.
    #[must_use]
    pub fn bs_header(&self) -> Option<&BsStreamHeader> {
        self.bs_header.as_ref()
    }

    /// Bethesda stream version, or 0 for non-Bethesda files.
    #[must_use]
    pub fn bs_version(&self) -> u32 {
        self.bs_header.as_ref().map_or(0, |bs| bs.version)
    }

    /// Number of blocks in the file.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.block_type_indices.len()
    }

    /// All distinct block type names.
    #[must_use]
    pub fn block_types(&self) -> &[String] {
        &self.block_types
    }

    /// Type name of block `index`.
    #[must_use]
    pub fn block_type(&self, index: usize) -> Option<&str> {
        let type_index = *self.block_type_indices.get(index)?;
        self.block_types
            .get(usize::from(type_index & 0x7FFF))
            .map(String::as_str)
    }

    /// Entry `index` of the header string table.
    #[must_use]
    pub fn string(&self, index: u32) -> Option<Cow<'_, str>> {
        self.strings
            .get(index as usize)
            .map(|s| String::from_utf8_lossy(s))
    }

    /// Number of entries in the header string table.
    #[must_use]
    pub fn string_count(&self) -> usize {
        self.strings.len()
    }
}

/// Format a packed version word as `a.b.c.d`.
#[must_use]
pub fn format_version(version: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        version >> 24,
        (version >> 16) & 0xFF,
        (version >> 8) & 0xFF,
        version & 0xFF
    )
}

/// Read the header, returning it together with the per-block sizes.
pub(crate) fn read_header<R: Read>(reader: &mut R) -> Result<(NifHeader, Vec<u32>)> {
    let header_line = read_header_line(reader)?;
    if !HEADER_PREFIXES.iter().any(|p| header_line.starts_with(p)) {
        return Err(Error::InvalidNifHeader(format!(
            "unrecognised header line {:?}",
            String::from_utf8_lossy(&header_line)
        )));
    }

    let version = reader.read_u32::<LittleEndian>()?;
    if version != NIF_VERSION_20_2_0_7 {
        return Err(Error::UnsupportedNifVersion {
            version: format_version(version),
        });
    }

    match reader.read_u8()? {
        1 => {}
        0 => return Err(Error::UnsupportedNifEndian),
        other => {
            return Err(Error::InvalidNifHeader(format!("invalid endian byte {other}")));
        }
    }

    let user_version = reader.read_u32::<LittleEndian>()?;
    let num_blocks = reader.read_u32::<LittleEndian>()? as usize;

    let bs_header = if user_version >= BS_HEADER_MIN_USER_VERSION {
        Some(read_bs_header(reader)?)
    } else {
        None
    };

    let num_block_types = reader.read_u16::<LittleEndian>()? as usize;
    let mut block_types = Vec::with_capacity(num_block_types);
    for _ in 0..num_block_types {
        let raw = read_sized_string(reader)?;
        let name = String::from_utf8(raw)
            .map_err(|_| Error::InvalidNifHeader("block type name is not UTF-8".to_string()))?;
        block_types.push(name);
    }

    let mut block_type_indices = Vec::new();
    for block in 0..num_blocks {
        let index = reader.read_u16::<LittleEndian>()?;
        if usize::from(index & 0x7FFF) >= block_types.len() {
            return Err(Error::InvalidBlockTypeIndex { block, index });
        }
        block_type_indices.push(index);
    }

    let mut block_sizes = Vec::new();
    for _ in 0..num_blocks {
        block_sizes.push(reader.read_u32::<LittleEndian>()?);
    }

    let num_strings = reader.read_u32::<LittleEndian>()?;
    let max_string_length = reader.read_u32::<LittleEndian>()?;
    let mut strings = Vec::new();
    for _ in 0..num_strings {
        strings.push(read_sized_string(reader)?);
    }

    let num_groups = reader.read_u32::<LittleEndian>()?;
    let mut groups = Vec::new();
    for _ in 0..num_groups {
        groups.push(reader.read_u32::<LittleEndian>()?);
    }

    let header = NifHeader {
        header_line,
        version,
        user_version,
        bs_header,
        block_types,
        block_type_indices,
        max_string_length,
        strings,
        groups,
    };

    tracing::debug!(
        "NIF header: version {}, user version {}, BS version {}, {} blocks",
        header.version_string(),
        header.user_version,
        header.bs_version(),
        num_blocks
    );

    Ok((header, block_sizes))
}

/// Write the header for blocks of the given sizes.
pub(crate) fn write_header<W: Write>(writer: &mut W, header: &NifHeader, block_sizes: &[u32]) -> Result<()> {
    writer.write_all(&header.header_line)?;
    writer.write_u8(b'\n')?;
    writer.write_u32::<LittleEndian>(header.version)?;
    writer.write_u8(1)?; // Little endian
    writer.write_u32::<LittleEndian>(header.user_version)?;
    writer.write_u32::<LittleEndian>(count_u32(header.block_type_indices.len())?)?;

    if let Some(bs) = &header.bs_header {
        write_bs_header(writer, bs)?;
    }

    let num_block_types = u16::try_from(header.block_types.len()).map_err(|_| Error::StringTooLong {
        len: header.block_types.len(),
        max: u16::MAX as usize,
    })?;
    writer.write_u16::<LittleEndian>(num_block_types)?;
    let mut buffer = Vec::new();
    for name in &header.block_types {
        write_sized_string(&mut buffer, name.as_bytes())?;
    }
    writer.write_all(&buffer)?;

    for &index in &header.block_type_indices {
        writer.write_u16::<LittleEndian>(index)?;
    }
    for &size in block_sizes {
        writer.write_u32::<LittleEndian>(size)?;
    }

    writer.write_u32::<LittleEndian>(count_u32(header.strings.len())?)?;
    writer.write_u32::<LittleEndian>(header.max_string_length)?;
    buffer.clear();
    for s in &header.strings {
        write_sized_string(&mut buffer, s)?;
    }
    writer.write_all(&buffer)?;

    writer.write_u32::<LittleEndian>(count_u32(header.groups.len())?)?;
    for &group in &header.groups {
        writer.write_u32::<LittleEndian>(group)?;
    }

    Ok(())
}

fn read_header_line<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    loop {
        let byte = reader.read_u8()?;
        if byte == b'\n' {
            return Ok(line);
        }
        if line.len() >= MAX_HEADER_LINE {
            return Err(Error::InvalidNifHeader("header line is not terminated".to_string()));
        }
        line.push(byte);
    }
}

fn read_bs_header<R: Read>(reader: &mut R) -> Result<BsStreamHeader> {
    let version = reader.read_u32::<LittleEndian>()?;
    let author = read_export_string(reader)?;
    let unknown = if version > BS_VERSION_FALLOUT_4 {
        Some(reader.read_u32::<LittleEndian>()?)
    } else {
        None
    };
    let process_script = if version <= BS_VERSION_FALLOUT_4 {
        Some(read_export_string(reader)?)
    } else {
        None
    };
    let export_script = read_export_string(reader)?;
    let max_filepath = if version == BS_VERSION_FALLOUT_4 {
        Some(read_export_string(reader)?)
    } else {
        None
    };

    Ok(BsStreamHeader {
        version,
        author,
        unknown,
        process_script,
        export_script,
        max_filepath,
    })
}

fn write_bs_header<W: Write>(writer: &mut W, bs: &BsStreamHeader) -> Result<()> {
    writer.write_u32::<LittleEndian>(bs.version)?;
    write_export_string(writer, &bs.author)?;
    if let Some(unknown) = bs.unknown {
        writer.write_u32::<LittleEndian>(unknown)?;
    }
    if let Some(process_script) = &bs.process_script {
        write_export_string(writer, process_script)?;
    }
    write_export_string(writer, &bs.export_script)?;
    if let Some(max_filepath) = &bs.max_filepath {
        write_export_string(writer, max_filepath)?;
    }
    Ok(())
}

/// Read a `u8`-length-prefixed string, keeping its null terminator.
fn read_export_string<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let len = reader.read_u8()? as usize;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

fn write_export_string<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    let len = u8::try_from(bytes.len()).map_err(|_| Error::StringTooLong {
        len: bytes.len(),
        max: u8::MAX as usize,
    })?;
    writer.write_u8(len)?;
    writer.write_all(bytes)?;
    Ok(())
}

fn export_string_text(bytes: &[u8]) -> Cow<'_, str> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end])
}

fn count_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::StringTooLong {
        len,
        max: u32::MAX as usize,
    })
}
