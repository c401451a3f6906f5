//! Gamebryo `.nif` mesh files, as written by Bethesda games (file version 20.2.0.7)
//!
//! Only what is needed to retarget textures is decoded: the header, shape
//! blocks (name and shader reference), lighting shader texture-set references,
//! `BSShaderTextureSet` and the source texture of `BSEffectShaderProperty`.
//! Every other block is carried as raw bytes, so a load/save cycle without
//! edits reproduces the input exactly.

mod blocks;
#[cfg(test)]
pub(crate) mod fixtures;
mod header;
mod reader;
mod writer;

use std::borrow::Cow;
use std::path::Path;

use crate::error::Result;

pub use blocks::{Block, EffectShader, TextureSet};
pub use header::{BsStreamHeader, NifHeader, format_version};
pub use reader::{parse_nif_bytes, read_nif};
pub use writer::{serialize_nif, write_nif};

/// Packed file version 20.2.0.7 (Skyrim, Fallout 4, Fallout 76)
pub const NIF_VERSION_20_2_0_7: u32 = 0x14020007;

/// Lowest user version that carries a Bethesda stream header
pub const BS_HEADER_MIN_USER_VERSION: u32 = 3;

/// Bethesda stream version of Skyrim LE
pub const BS_VERSION_SKYRIM_LE: u32 = 83;
/// Bethesda stream version of Skyrim SE / AE
pub const BS_VERSION_SKYRIM_SE: u32 = 100;
/// Bethesda stream version of Fallout 4
pub const BS_VERSION_FALLOUT_4: u32 = 130;
/// First Bethesda stream version that stores shader flags as arrays
pub const BS_VERSION_SHADER_FLAG_ARRAYS: u32 = 132;
/// Bethesda stream version of Fallout 76
pub const BS_VERSION_FALLOUT_76: u32 = 155;

/// Handle to a shape block inside a [`NifFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeRef(pub(crate) usize);

impl ShapeRef {
    /// Index of the shape's block.
    #[must_use]
    pub fn block_index(self) -> usize {
        self.0
    }
}

/// Where a shape's texture paths live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextureBinding {
    /// Lighting shader pointing at a `BSShaderTextureSet` block
    TextureSet(usize),
    /// `BSEffectShaderProperty` block with an inline source texture
    EffectShader(usize),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShapeInfo {
    pub block: usize,
    pub name: Option<u32>,
    pub binding: TextureBinding,
}

/// An in-memory NIF file.
#[derive(Debug, Clone)]
pub struct NifFile {
    pub(crate) header: NifHeader,
    pub(crate) blocks: Vec<Block>,
    pub(crate) roots: Vec<i32>,
    pub(crate) shapes: Vec<ShapeInfo>,
}

impl NifFile {
    /// Load a NIF file from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a supported NIF.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_nif(path)
    }

    /// Parse a NIF file from bytes.
    ///
    /// # Errors
    /// Returns an error if the data is not a supported NIF.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        parse_nif_bytes(data)
    }

    /// Save the NIF file to disk, overwriting any existing file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written or a string overflows its length prefix.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_nif(path, self)
    }

    /// Serialize the NIF file to bytes.
    ///
    /// # Errors
    /// Returns an error if a string overflows its length prefix.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialize_nif(self)
    }

    #[must_use]
    pub fn header(&self) -> &NifHeader {
        &self.header
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Type name of block `index`.
    #[must_use]
    pub fn block_type(&self, index: usize) -> Option<&str> {
        self.header.block_type(index)
    }

    /// Root block references from the footer.
    #[must_use]
    pub fn roots(&self) -> &[i32] {
        &self.roots
    }

    /// Shapes in block order.
    pub fn shapes(&self) -> impl Iterator<Item = ShapeRef> + '_ {
        self.shapes.iter().map(|shape| ShapeRef(shape.block))
    }

    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Name of a shape, resolved through the header string table.
    #[must_use]
    pub fn shape_name(&self, shape: ShapeRef) -> Option<Cow<'_, str>> {
        let index = self.shape_info(shape)?.name?;
        self.header.string(index)
    }

    /// Texture path in `slot` of a shape (slot 0 is the diffuse texture).
    ///
    /// Returns `None` if the shape has no texture binding or the slot does not exist.
    #[must_use]
    pub fn texture_slot(&self, shape: ShapeRef, slot: usize) -> Option<String> {
        match self.shape_info(shape)?.binding {
            TextureBinding::TextureSet(block) => match &self.blocks[block] {
                Block::TextureSet(set) => set.get(slot).map(Cow::into_owned),
                _ => None,
            },
            TextureBinding::EffectShader(block) => match &self.blocks[block] {
                Block::EffectShader(shader) if slot == 0 => Some(shader.source_texture().into_owned()),
                _ => None,
            },
            TextureBinding::None => None,
        }
    }

    /// Overwrite the texture path in `slot` of a shape.
    ///
    /// Returns `false`, leaving the file untouched, if the shape has no texture
    /// binding or the slot does not exist.
    pub fn set_texture_slot(&mut self, shape: ShapeRef, slot: usize, path: &str) -> bool {
        let Some(binding) = self.shape_info(shape).map(|info| info.binding) else {
            return false;
        };
        match binding {
            TextureBinding::TextureSet(block) => match &mut self.blocks[block] {
                Block::TextureSet(set) => set.set(slot, path),
                _ => false,
            },
            TextureBinding::EffectShader(block) => match &mut self.blocks[block] {
                Block::EffectShader(shader) if slot == 0 => {
                    shader.set_source_texture(path);
                    true
                }
                _ => false,
            },
            TextureBinding::None => false,
        }
    }

    fn shape_info(&self, shape: ShapeRef) -> Option<&ShapeInfo> {
        self.shapes.iter().find(|info| info.block == shape.0)
    }
}
