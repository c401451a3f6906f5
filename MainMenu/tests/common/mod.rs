//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use zip::write::SimpleFileOptions;

const NONE_REF: i32 = -1;

/// A Skyrim SE logo mesh with one textured shape per entry of `textures`.
pub fn logo_nif(textures: &[&str]) -> Vec<u8> {
    let mut blocks: Vec<(&str, Vec<u8>)> = vec![("BSFadeNode", fade_node(textures.len()))];
    for (i, texture) in textures.iter().enumerate() {
        let shape = 1 + 3 * i as i32;
        blocks.push(("BSTriShape", tri_shape(shape + 1)));
        blocks.push(("BSLightingShaderProperty", lighting_shader(shape + 2)));
        blocks.push(("BSShaderTextureSet", texture_set(&[*texture, "textures\\logo_n.dds"])));
    }
    build_nif(&blocks)
}

fn build_nif(blocks: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut out = b"Gamebryo File Format, Version 20.2.0.7\n".to_vec();
    out.write_u32::<LittleEndian>(0x14020007).unwrap();
    out.write_u8(1).unwrap();
    out.write_u32::<LittleEndian>(12).unwrap();
    out.write_u32::<LittleEndian>(blocks.len() as u32).unwrap();

    // Stream header: SSE, empty author, process script and export script
    out.write_u32::<LittleEndian>(100).unwrap();
    for _ in 0..3 {
        out.extend_from_slice(&[1, 0]);
    }

    let mut types: Vec<&str> = Vec::new();
    let mut indices = Vec::new();
    for (name, _) in blocks {
        if !types.contains(name) {
            types.push(*name);
        }
        indices.push(types.iter().position(|t| t == name).unwrap() as u16);
    }
    out.write_u16::<LittleEndian>(types.len() as u16).unwrap();
    for name in &types {
        sized_string(&mut out, name);
    }
    for index in indices {
        out.write_u16::<LittleEndian>(index).unwrap();
    }
    for (_, payload) in blocks {
        out.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
    }

    // One string ("Logo"), no groups
    out.write_u32::<LittleEndian>(1).unwrap();
    out.write_u32::<LittleEndian>(4).unwrap();
    sized_string(&mut out, "Logo");
    out.write_u32::<LittleEndian>(0).unwrap();

    for (_, payload) in blocks {
        out.extend_from_slice(payload);
    }
    out.write_u32::<LittleEndian>(1).unwrap();
    out.write_i32::<LittleEndian>(0).unwrap();
    out
}

fn fade_node(children: usize) -> Vec<u8> {
    let mut out = Vec::new();
    object_net(&mut out, None);
    av_object(&mut out);
    out.write_u32::<LittleEndian>(children as u32).unwrap();
    for i in 0..children {
        out.write_i32::<LittleEndian>(1 + 3 * i as i32).unwrap();
    }
    out.write_u32::<LittleEndian>(0).unwrap();
    out
}

fn tri_shape(shader: i32) -> Vec<u8> {
    let mut out = Vec::new();
    object_net(&mut out, Some(0));
    av_object(&mut out);
    out.extend_from_slice(&[0; 16]);
    out.write_i32::<LittleEndian>(NONE_REF).unwrap();
    out.write_i32::<LittleEndian>(shader).unwrap();
    out.write_i32::<LittleEndian>(NONE_REF).unwrap();
    out.extend_from_slice(&[0; 8 + 4 + 2 + 4]);
    out
}

fn lighting_shader(texture_set: i32) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(0).unwrap();
    object_net(&mut out, None);
    out.extend_from_slice(&[0; 8 + 16]);
    out.write_i32::<LittleEndian>(texture_set).unwrap();
    out.extend_from_slice(&[0x3F; 32]);
    out
}

fn texture_set(textures: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_i32::<LittleEndian>(textures.len() as i32).unwrap();
    for texture in textures {
        sized_string(&mut out, texture);
    }
    out
}

fn object_net(out: &mut Vec<u8>, name: Option<u32>) {
    out.write_u32::<LittleEndian>(name.unwrap_or(u32::MAX)).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    out.write_i32::<LittleEndian>(NONE_REF).unwrap();
}

fn av_object(out: &mut Vec<u8>) {
    out.write_u32::<LittleEndian>(14).unwrap();
    out.extend_from_slice(&[0; 52]);
    out.write_i32::<LittleEndian>(NONE_REF).unwrap();
}

fn sized_string(out: &mut Vec<u8>, value: &str) {
    out.write_u32::<LittleEndian>(value.len() as u32).unwrap();
    out.extend_from_slice(value.as_bytes());
}

/// Write a zip archive with the given entries.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

/// Every file in a zip archive, by entry name.
pub fn read_zip(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut files = BTreeMap::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).unwrap();
        if entry.is_dir() {
            continue;
        }
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        files.insert(entry.name().to_string(), data);
    }
    files
}

/// Number of entries left in a directory.
pub fn entry_count(dir: &Path) -> usize {
    fs::read_dir(dir).map(Iterator::count).unwrap_or(0)
}
