//! Block payloads the crate understands
//!
//! Everything else stays [`Block::Opaque`] and is written back untouched.

use std::borrow::Cow;
use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{
    BS_VERSION_FALLOUT_4, BS_VERSION_FALLOUT_76, BS_VERSION_SHADER_FLAG_ARRAYS,
    NIF_VERSION_20_2_0_7,
};
use crate::error::{Error, Result};

/// Shapes deriving from `NiGeometry` (Skyrim LE and older).
pub(crate) const GEOMETRY_SHAPE_TYPES: &[&str] = &[
    "NiTriShape",
    "NiTriStrips",
    "BSLODTriShape",
    "BSSegmentedTriShape",
];

/// Shapes deriving from `BSTriShape` (Skyrim SE and newer).
pub(crate) const TRI_SHAPE_TYPES: &[&str] = &[
    "BSTriShape",
    "BSSubIndexTriShape",
    "BSMeshLODTriShape",
    "BSDynamicTriShape",
];

pub(crate) const TEXTURE_SET_TYPE: &str = "BSShaderTextureSet";
pub(crate) const LIGHTING_SHADER_TYPE: &str = "BSLightingShaderProperty";
pub(crate) const EFFECT_SHADER_TYPE: &str = "BSEffectShaderProperty";

/// Size of an `NiAVObject` transform: translation, 3x3 rotation, scale.
const TRANSFORM_SIZE: i64 = 12 + 36 + 4;

/// A single block of a NIF file.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// `BSShaderTextureSet`
    TextureSet(TextureSet),
    /// `BSEffectShaderProperty`, split around its source texture
    EffectShader(EffectShader),
    /// Any block this crate does not decode
    Opaque(Vec<u8>),
}

impl Block {
    /// Decode a raw block payload according to its type name.
    pub(crate) fn decode(index: usize, type_name: &str, raw: Vec<u8>, bs_version: u32) -> Result<Self> {
        match type_name {
            TEXTURE_SET_TYPE => TextureSet::decode(&raw)
                .map(Block::TextureSet)
                .map_err(|message| malformed(index, type_name, message)),
            EFFECT_SHADER_TYPE if bs_version < BS_VERSION_SHADER_FLAG_ARRAYS => {
                EffectShader::decode(&raw)
                    .map(Block::EffectShader)
                    .map_err(|message| malformed(index, type_name, message))
            }
            _ => Ok(Block::Opaque(raw)),
        }
    }

    /// Serialize the block payload.
    pub(crate) fn encode(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Block::TextureSet(set) => set.encode().map(Cow::Owned),
            Block::EffectShader(shader) => shader.encode().map(Cow::Owned),
            Block::Opaque(raw) => Ok(Cow::Borrowed(raw)),
        }
    }
}

/// `BSShaderTextureSet`: an ordered list of texture paths.
///
/// Slot 0 is the diffuse map, slot 1 the normal map; the rest vary per game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureSet {
    textures: Vec<Vec<u8>>,
}

impl TextureSet {
    /// Create a texture set from paths.
    #[must_use]
    pub fn new<S: AsRef<str>>(textures: &[S]) -> Self {
        Self {
            textures: textures
                .iter()
                .map(|t| t.as_ref().as_bytes().to_vec())
                .collect(),
        }
    }

    /// Number of texture slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Texture path in `slot`.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<Cow<'_, str>> {
        self.textures.get(slot).map(|t| String::from_utf8_lossy(t))
    }

    /// Overwrite the path in `slot`. Returns `false` if the slot does not exist.
    pub fn set(&mut self, slot: usize, path: &str) -> bool {
        match self.textures.get_mut(slot) {
            Some(texture) => {
                *texture = path.as_bytes().to_vec();
                true
            }
            None => false,
        }
    }

    fn decode(raw: &[u8]) -> std::result::Result<Self, String> {
        let mut cursor = Cursor::new(raw);
        let count = cursor
            .read_i32::<LittleEndian>()
            .map_err(|_| "missing texture count".to_string())?;
        let count = usize::try_from(count).map_err(|_| format!("negative texture count {count}"))?;

        let mut textures = Vec::with_capacity(count.min(raw.len() / 4));
        for slot in 0..count {
            let texture = read_sized_string(&mut cursor)
                .map_err(|_| format!("texture {slot} runs past the end of the block"))?;
            textures.push(texture);
        }

        if cursor.position() != raw.len() as u64 {
            return Err(format!(
                "{} unread bytes after {count} textures",
                raw.len() as u64 - cursor.position()
            ));
        }

        Ok(Self { textures })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let count = i32::try_from(self.textures.len()).map_err(|_| Error::StringTooLong {
            len: self.textures.len(),
            max: i32::MAX as usize,
        })?;
        out.write_i32::<LittleEndian>(count)?;
        for texture in &self.textures {
            write_sized_string(&mut out, texture)?;
        }
        Ok(out)
    }
}

/// `BSEffectShaderProperty`, kept as the bytes around its source texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectShader {
    head: Vec<u8>,
    source_texture: Vec<u8>,
    tail: Vec<u8>,
}

impl EffectShader {
    /// The source (diffuse) texture path.
    #[must_use]
    pub fn source_texture(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.source_texture)
    }

    pub fn set_source_texture(&mut self, path: &str) {
        self.source_texture = path.as_bytes().to_vec();
    }

    fn decode(raw: &[u8]) -> std::result::Result<Self, String> {
        let mut cursor = Cursor::new(raw);
        skip_object_net(&mut cursor, false).map_err(|_| "truncated object header".to_string())?;
        // Shader flags 1 and 2, UV offset, UV scale.
        skip(&mut cursor, 8 + 16).map_err(|_| "truncated shader header".to_string())?;

        let head_len = cursor.position() as usize;
        let source_texture = read_sized_string(&mut cursor)
            .map_err(|_| "source texture runs past the end of the block".to_string())?;
        let tail_start = cursor.position() as usize;

        Ok(Self {
            head: raw[..head_len].to_vec(),
            source_texture,
            tail: raw[tail_start..].to_vec(),
        })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut out =
            Vec::with_capacity(self.head.len() + 4 + self.source_texture.len() + self.tail.len());
        out.extend_from_slice(&self.head);
        write_sized_string(&mut out, &self.source_texture)?;
        out.extend_from_slice(&self.tail);
        Ok(out)
    }
}

/// Fields pulled out of a shape block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ShapeFields {
    /// Header string index of the shape name
    pub name: Option<u32>,
    /// Block reference of the shader property (-1 for none)
    pub shader_property: i32,
}

/// Read the name and shader property reference of a shape block.
pub(crate) fn read_shape_fields(
    raw: &[u8],
    type_name: &str,
    version: u32,
    bs_version: u32,
) -> std::io::Result<ShapeFields> {
    let mut cursor = Cursor::new(raw);
    let name = skip_object_net(&mut cursor, false)?;
    skip_av_object(&mut cursor, bs_version)?;

    if TRI_SHAPE_TYPES.contains(&type_name) {
        // Bounding sphere
        skip(&mut cursor, 16)?;
        if bs_version >= BS_VERSION_FALLOUT_76 {
            // Bound min/max
            skip(&mut cursor, 24)?;
        }
        // Skin instance
        skip(&mut cursor, 4)?;
    } else {
        // Data and skin instance
        skip(&mut cursor, 8)?;
        let num_materials = i64::from(cursor.read_u32::<LittleEndian>()?);
        // Material names, material extra data, active material
        skip(&mut cursor, num_materials * 8 + 4)?;
        if version >= NIF_VERSION_20_2_0_7 {
            // Material needs update
            skip(&mut cursor, 1)?;
        }
    }

    let shader_property = cursor.read_i32::<LittleEndian>()?;
    Ok(ShapeFields {
        name,
        shader_property,
    })
}

/// Read the texture set reference of a `BSLightingShaderProperty`.
pub(crate) fn read_lighting_texture_set(raw: &[u8], bs_version: u32) -> std::io::Result<i32> {
    let mut cursor = Cursor::new(raw);
    skip_object_net(&mut cursor, bs_version < BS_VERSION_FALLOUT_4)?;
    // Shader flags 1 and 2, UV offset, UV scale.
    skip(&mut cursor, 8 + 16)?;
    cursor.read_i32::<LittleEndian>()
}

/// Skip `NiObjectNET`, returning the name string index.
///
/// Skyrim-era `BSLightingShaderProperty` blocks carry their shader type in front of it.
fn skip_object_net(cursor: &mut Cursor<&[u8]>, has_shader_type: bool) -> std::io::Result<Option<u32>> {
    if has_shader_type {
        skip(cursor, 4)?;
    }
    let name = cursor.read_u32::<LittleEndian>()?;
    let num_extra_data = i64::from(cursor.read_u32::<LittleEndian>()?);
    // Extra data refs, controller ref
    skip(cursor, num_extra_data * 4 + 4)?;
    Ok((name != u32::MAX).then_some(name))
}

fn skip_av_object(cursor: &mut Cursor<&[u8]>, bs_version: u32) -> std::io::Result<()> {
    let flags_size = if bs_version > 26 { 4 } else { 2 };
    skip(cursor, flags_size + TRANSFORM_SIZE)?;
    if bs_version <= 34 {
        let num_properties = i64::from(cursor.read_u32::<LittleEndian>()?);
        skip(cursor, num_properties * 4)?;
    }
    // Collision object
    skip(cursor, 4)
}

/// Seek forward, failing if that would pass the end of the data.
fn skip(cursor: &mut Cursor<&[u8]>, count: i64) -> std::io::Result<()> {
    let remaining = cursor.get_ref().len() as u64 - cursor.position().min(cursor.get_ref().len() as u64);
    if count < 0 || count as u64 > remaining {
        return Err(std::io::ErrorKind::UnexpectedEof.into());
    }
    cursor.seek(SeekFrom::Current(count))?;
    Ok(())
}

/// Read a `u32`-length-prefixed string.
pub(crate) fn read_sized_string<R: Read>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let len = reader.read_u32::<LittleEndian>()? as usize;
    let mut bytes = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(std::io::ErrorKind::UnexpectedEof.into());
    }
    Ok(bytes)
}

/// Write a `u32`-length-prefixed string.
pub(crate) fn write_sized_string(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    let len = u32::try_from(bytes.len()).map_err(|_| Error::StringTooLong {
        len: bytes.len(),
        max: u32::MAX as usize,
    })?;
    out.write_u32::<LittleEndian>(len)?;
    out.extend_from_slice(bytes);
    Ok(())
}

fn malformed(block: usize, block_type: &str, message: String) -> Error {
    Error::MalformedBlock {
        block,
        block_type: block_type.to_string(),
        message,
    }
}
