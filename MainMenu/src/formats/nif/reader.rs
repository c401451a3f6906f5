//! NIF file reading

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use super::blocks::{
    self, Block, EFFECT_SHADER_TYPE, GEOMETRY_SHAPE_TYPES, LIGHTING_SHADER_TYPE, TRI_SHAPE_TYPES,
};
use super::header::{self, NifHeader};
use super::{BS_VERSION_SHADER_FLAG_ARRAYS, NifFile, ShapeInfo, TextureBinding};
use crate::error::{Error, Result};

/// Read a NIF file from disk.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or is truncated.
/// Returns a format error if the header or a decoded block is invalid.
///
/// [`Error::Io`]: crate::Error::Io
pub fn read_nif<P: AsRef<Path>>(path: P) -> Result<NifFile> {
    let path = path.as_ref();
    tracing::debug!("Reading NIF: {}", path.display());
    let data = fs::read(path)?;
    parse_nif_bytes(&data)
}

/// Parse NIF data from bytes.
///
/// # Errors
///
/// Returns [`Error::Io`] if the data is truncated.
/// Returns a format error if the header or a decoded block is invalid.
///
/// [`Error::Io`]: crate::Error::Io
pub fn parse_nif_bytes(data: &[u8]) -> Result<NifFile> {
    let mut cursor = Cursor::new(data);
    let (header, block_sizes) = header::read_header(&mut cursor)?;

    let mut blocks = Vec::with_capacity(block_sizes.len().min(data.len()));
    for (index, &size) in block_sizes.iter().enumerate() {
        let type_name = header.block_type(index).unwrap_or_default();
        let remaining = data.len() as u64 - cursor.position();
        if u64::from(size) > remaining {
            return Err(Error::MalformedBlock {
                block: index,
                block_type: type_name.to_string(),
                message: format!("declared size {size} exceeds the {remaining} bytes left"),
            });
        }

        let mut raw = vec![0u8; size as usize];
        cursor.read_exact(&mut raw)?;
        blocks.push(Block::decode(index, type_name, raw, header.bs_version())?);
    }

    let num_roots = cursor.read_u32::<LittleEndian>()?;
    let mut roots = Vec::new();
    for _ in 0..num_roots {
        roots.push(cursor.read_i32::<LittleEndian>()?);
    }

    let trailing = data.len() as u64 - cursor.position();
    if trailing > 0 {
        tracing::debug!("Ignoring {trailing} trailing bytes after NIF footer");
    }

    let shapes = index_shapes(&header, &blocks)?;
    tracing::debug!("Parsed {} blocks, {} shapes", blocks.len(), shapes.len());

    Ok(NifFile {
        header,
        blocks,
        roots,
        shapes,
    })
}

/// Find every shape block and resolve where its textures live.
fn index_shapes(header: &NifHeader, blocks: &[Block]) -> Result<Vec<ShapeInfo>> {
    let bs_version = header.bs_version();
    let mut shapes = Vec::new();

    for (index, block) in blocks.iter().enumerate() {
        let type_name = header.block_type(index).unwrap_or_default();
        if !GEOMETRY_SHAPE_TYPES.contains(&type_name) && !TRI_SHAPE_TYPES.contains(&type_name) {
            continue;
        }
        let Block::Opaque(raw) = block else {
            continue;
        };

        let fields = blocks::read_shape_fields(raw, type_name, header.version(), bs_version)
            .map_err(|_| Error::MalformedBlock {
                block: index,
                block_type: type_name.to_string(),
                message: "shape block is truncated".to_string(),
            })?;

        // Before shader property refs existed, textures hung off a property list.
        let binding = if bs_version > 34 {
            resolve_binding(header, blocks, index, fields.shader_property)?
        } else {
            TextureBinding::None
        };

        if binding == TextureBinding::None {
            tracing::debug!("Shape block {index} ({type_name}) has no texture binding");
        }

        shapes.push(ShapeInfo {
            block: index,
            name: fields.name,
            binding,
        });
    }

    Ok(shapes)
}

fn resolve_binding(
    header: &NifHeader,
    blocks: &[Block],
    shape: usize,
    shader_ref: i32,
) -> Result<TextureBinding> {
    let Some(shader) = resolve_ref(blocks, shape, shader_ref)? else {
        return Ok(TextureBinding::None);
    };
    let bs_version = header.bs_version();
    if bs_version >= BS_VERSION_SHADER_FLAG_ARRAYS {
        return Ok(TextureBinding::None);
    }

    match (header.block_type(shader), &blocks[shader]) {
        (Some(LIGHTING_SHADER_TYPE), Block::Opaque(raw)) => {
            let set_ref = blocks::read_lighting_texture_set(raw, bs_version).map_err(|_| {
                Error::MalformedBlock {
                    block: shader,
                    block_type: LIGHTING_SHADER_TYPE.to_string(),
                    message: "shader block is truncated".to_string(),
                }
            })?;
            match resolve_ref(blocks, shader, set_ref)? {
                Some(set) if matches!(blocks[set], Block::TextureSet(_)) => {
                    Ok(TextureBinding::TextureSet(set))
                }
                _ => Ok(TextureBinding::None),
            }
        }
        (Some(EFFECT_SHADER_TYPE), Block::EffectShader(_)) => Ok(TextureBinding::EffectShader(shader)),
        _ => Ok(TextureBinding::None),
    }
}

/// Turn a block reference into an index; -1 (or any negative value) means none.
fn resolve_ref(blocks: &[Block], from: usize, target: i32) -> Result<Option<usize>> {
    let Ok(index) = usize::try_from(target) else {
        return Ok(None);
    };
    if index >= blocks.len() {
        return Err(Error::InvalidBlockRef {
            block: from,
            target,
        });
    }
    Ok(Some(index))
}
