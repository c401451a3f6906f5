//! Hand-built NIF data for unit tests

use byteorder::{LittleEndian, WriteBytesExt};

use super::{BS_VERSION_FALLOUT_4, BS_VERSION_FALLOUT_76, BS_VERSION_SKYRIM_SE, NIF_VERSION_20_2_0_7};

const NONE_REF: i32 = -1;

/// Assembles a complete little-endian 20.2.0.7 file.
pub(crate) struct NifBuilder {
    bs_version: u32,
    blocks: Vec<(String, Vec<u8>)>,
    strings: Vec<String>,
    /// Written for every block instead of the real type index
    pub type_index_override: Option<u16>,
}

impl NifBuilder {
    pub fn new(bs_version: u32) -> Self {
        Self {
            bs_version,
            blocks: Vec::new(),
            strings: Vec::new(),
            type_index_override: None,
        }
    }

    pub fn block(mut self, type_name: &str, payload: Vec<u8>) -> Self {
        self.blocks.push((type_name.to_string(), payload));
        self
    }

    pub fn string(mut self, value: &str) -> Self {
        self.strings.push(value.to_string());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = b"Gamebryo File Format, Version 20.2.0.7\n".to_vec();
        out.write_u32::<LittleEndian>(NIF_VERSION_20_2_0_7).unwrap();
        out.write_u8(1).unwrap();
        out.write_u32::<LittleEndian>(12).unwrap();
        out.write_u32::<LittleEndian>(self.blocks.len() as u32).unwrap();

        out.write_u32::<LittleEndian>(self.bs_version).unwrap();
        export_string(&mut out);
        if self.bs_version > BS_VERSION_FALLOUT_4 {
            out.write_u32::<LittleEndian>(0).unwrap();
        } else {
            export_string(&mut out);
        }
        export_string(&mut out);
        if self.bs_version == BS_VERSION_FALLOUT_4 {
            export_string(&mut out);
        }

        let mut types: Vec<&str> = Vec::new();
        let mut indices = Vec::new();
        for (name, _) in &self.blocks {
            let index = match types.iter().position(|t| t == name) {
                Some(index) => index,
                None => {
                    types.push(name);
                    types.len() - 1
                }
            };
            indices.push(self.type_index_override.unwrap_or(index as u16));
        }

        out.write_u16::<LittleEndian>(types.len() as u16).unwrap();
        for name in &types {
            sized_string(&mut out, name);
        }
        for index in indices {
            out.write_u16::<LittleEndian>(index).unwrap();
        }
        for (_, payload) in &self.blocks {
            out.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
        }

        out.write_u32::<LittleEndian>(self.strings.len() as u32).unwrap();
        let max_len = self.strings.iter().map(String::len).max().unwrap_or(0);
        out.write_u32::<LittleEndian>(max_len as u32).unwrap();
        for s in &self.strings {
            sized_string(&mut out, s);
        }
        // Groups
        out.write_u32::<LittleEndian>(0).unwrap();

        for (_, payload) in &self.blocks {
            out.extend_from_slice(payload);
        }

        // One root: block 0
        out.write_u32::<LittleEndian>(1).unwrap();
        out.write_i32::<LittleEndian>(0).unwrap();
        out
    }
}

/// A Skyrim SE logo mesh: root node, one named shape, lighting shader, texture set.
pub(crate) fn skyrim_se_logo(textures: &[&str]) -> Vec<u8> {
    NifBuilder::new(BS_VERSION_SKYRIM_SE)
        .string("Logo:0")
        .block("BSFadeNode", fade_node(&[1]))
        .block("BSTriShape", bs_tri_shape(Some(0), 2, BS_VERSION_SKYRIM_SE))
        .block("BSLightingShaderProperty", lighting_shader(3))
        .block("BSShaderTextureSet", texture_set(textures))
        .build()
}

pub(crate) fn texture_set(textures: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_i32::<LittleEndian>(textures.len() as i32).unwrap();
    for texture in textures {
        sized_string(&mut out, texture);
    }
    out
}

pub(crate) fn effect_shader(source_texture: &str) -> Vec<u8> {
    let mut out = Vec::new();
    object_net(&mut out, None);
    out.extend_from_slice(&[0x11; 8]); // Shader flags
    out.extend_from_slice(&[0x22; 16]); // UV offset and scale
    sized_string(&mut out, source_texture);
    // Texture clamp mode, lighting influence, env map min LOD, falloff
    out.extend_from_slice(&[3, 0, 0, 0, 0x80, 0x3F, 0x00, 0x00]);
    sized_string(&mut out, "textures\\effects\\gradient.dds");
    out
}

pub(crate) fn bs_tri_shape(name: Option<u32>, shader: i32, bs_version: u32) -> Vec<u8> {
    let mut out = Vec::new();
    object_net(&mut out, name);
    av_object(&mut out);
    out.extend_from_slice(&[0x33; 16]); // Bounding sphere
    if bs_version >= BS_VERSION_FALLOUT_76 {
        out.extend_from_slice(&[0x44; 24]);
    }
    out.write_i32::<LittleEndian>(NONE_REF).unwrap(); // Skin
    out.write_i32::<LittleEndian>(shader).unwrap();
    out.write_i32::<LittleEndian>(NONE_REF).unwrap(); // Alpha property
    out.extend_from_slice(&[0; 8]); // Vertex descriptor
    out.write_u32::<LittleEndian>(0).unwrap(); // Triangles
    out.write_u16::<LittleEndian>(0).unwrap(); // Vertices
    out.write_u32::<LittleEndian>(0).unwrap(); // Data size
    out
}

/// `NiTriShape` laid out for Skyrim LE.
pub(crate) fn ni_tri_shape(name: Option<u32>, shader: i32) -> Vec<u8> {
    let mut out = Vec::new();
    object_net(&mut out, name);
    av_object(&mut out);
    out.write_i32::<LittleEndian>(4).unwrap(); // Data
    out.write_i32::<LittleEndian>(NONE_REF).unwrap(); // Skin
    out.write_u32::<LittleEndian>(0).unwrap(); // Materials
    out.write_i32::<LittleEndian>(0).unwrap(); // Active material
    out.write_u8(0).unwrap(); // Material needs update
    out.write_i32::<LittleEndian>(shader).unwrap();
    out.write_i32::<LittleEndian>(NONE_REF).unwrap(); // Alpha property
    out
}

/// `BSLightingShaderProperty` laid out for Skyrim (shader type first).
pub(crate) fn lighting_shader(texture_set: i32) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(0).unwrap(); // Shader type
    object_net(&mut out, None);
    out.extend_from_slice(&[0x55; 8]);
    out.extend_from_slice(&[0x66; 16]);
    out.write_i32::<LittleEndian>(texture_set).unwrap();
    out.extend_from_slice(&[0x77; 40]); // Emissive color onwards
    out
}

fn fade_node(children: &[i32]) -> Vec<u8> {
    let mut out = Vec::new();
    object_net(&mut out, None);
    av_object(&mut out);
    out.write_u32::<LittleEndian>(children.len() as u32).unwrap();
    for &child in children {
        out.write_i32::<LittleEndian>(child).unwrap();
    }
    out.write_u32::<LittleEndian>(0).unwrap(); // Effects
    out
}

fn object_net(out: &mut Vec<u8>, name: Option<u32>) {
    out.write_u32::<LittleEndian>(name.unwrap_or(u32::MAX)).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap(); // Extra data
    out.write_i32::<LittleEndian>(NONE_REF).unwrap(); // Controller
}

fn av_object(out: &mut Vec<u8>) {
    out.write_u32::<LittleEndian>(14).unwrap(); // Flags
    out.extend_from_slice(&[0; 12]); // Translation
    for row in 0..3 {
        for col in 0..3 {
            let value: f32 = if row == col { 1.0 } else { 0.0 };
            out.write_f32::<LittleEndian>(value).unwrap();
        }
    }
    out.write_f32::<LittleEndian>(1.0).unwrap(); // Scale
    out.write_i32::<LittleEndian>(NONE_REF).unwrap(); // Collision
}

fn export_string(out: &mut Vec<u8>) {
    out.write_u8(1).unwrap();
    out.write_u8(0).unwrap();
}

fn sized_string(out: &mut Vec<u8>, value: &str) {
    out.write_u32::<LittleEndian>(value.len() as u32).unwrap();
    out.extend_from_slice(value.as_bytes());
}
