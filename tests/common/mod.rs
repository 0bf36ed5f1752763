//! Shared fixture builders for integration tests.
//!
//! Tiles are built in memory: a feature table, then a GLB whose binary chunk
//! holds the images first and a small geometry block last, so the geometry
//! view is declared before the image views but stored after them.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use serde_json::{json, Value};
use tileforged::transcode::TranscodeSettings;
use tileforged_format::{padding_for, B3dm, Glb, Gltf};

/// One VEC3 float position.
pub const GEOMETRY: [u8; 12] = [0, 0, 128, 63, 0, 0, 0, 64, 0, 0, 64, 64];

/// Feature table JSON, space-padded to 8 bytes.
pub const FEATURE_TABLE: &[u8] = b"{\"BATCH_LENGTH\":0}      ";

/// Settings that force every fixture image to be downscaled.
pub fn small_settings() -> TranscodeSettings {
    TranscodeSettings {
        max_size: 64,
        ..TranscodeSettings::default()
    }
}

fn noisy_rgb(width: u32, height: u32, seed: u32) -> RgbImage {
    let mut state = 0x9e37_79b9u32 ^ seed.wrapping_mul(0x85eb_ca6b) | 1;
    RgbImage::from_fn(width, height, |x, y| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let n = (state & 0x3f) as u8;
        Rgb([(x as u8).wrapping_add(n), (y as u8) ^ n, n.wrapping_mul(5)])
    })
}

/// A noisy JPEG encoded at maximum quality.
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    jpeg_seeded(width, height, 0)
}

pub fn jpeg_seeded(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, 100);
    noisy_rgb(width, height, seed)
        .write_with_encoder(encoder)
        .expect("encode fixture jpeg");
    out
}

/// A noisy PNG with an alpha channel.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let rgb = noisy_rgb(width, height, 7);
    let rgba = RgbaImage::from_fn(width, height, |x, y| {
        let p = rgb.get_pixel(x, y);
        Rgba([p[0], p[1], p[2], (x % 256) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    rgba.write_to(&mut out, ImageFormat::Png)
        .expect("encode fixture png");
    out.into_inner()
}

/// Bytes no image codec recognizes.
pub fn garbage_image() -> Vec<u8> {
    b"definitely not a picture, just some words".to_vec()
}

/// Build a tile embedding the given `(bytes, mime type)` images.
pub fn tile(images: &[(Vec<u8>, &str)]) -> Vec<u8> {
    let mut bin = Vec::new();
    let mut views = vec![Value::Null];
    let mut entries = Vec::new();

    for (i, (data, mime)) in images.iter().enumerate() {
        let offset = bin.len();
        bin.extend_from_slice(data);
        bin.resize(bin.len() + padding_for(data.len()), 0);
        views.push(json!({"buffer": 0, "byteOffset": offset, "byteLength": data.len()}));
        entries.push(json!({
            "bufferView": i + 1,
            "mimeType": mime,
            "name": format!("texture_{}", i),
        }));
    }

    let geometry_offset = bin.len();
    bin.extend_from_slice(&GEOMETRY);
    views[0] = json!({
        "buffer": 0,
        "byteOffset": geometry_offset,
        "byteLength": GEOMETRY.len(),
        "target": 34962,
    });

    let mut doc = json!({
        "asset": {"version": "2.0", "generator": "fixture"},
        "buffers": [{"byteLength": bin.len()}],
        "bufferViews": views,
        "accessors": [{"bufferView": 0, "componentType": 5126, "count": 1, "type": "VEC3"}],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "material": 0}]}],
    });
    if !entries.is_empty() {
        doc["images"] = Value::Array(entries);
    }

    build_tile(doc, bin)
}

/// A tile with geometry only.
pub fn tile_without_images() -> Vec<u8> {
    tile(&[])
}

/// Assemble a tile from a glTF document and its binary chunk.
pub fn build_tile(doc: Value, bin: Vec<u8>) -> Vec<u8> {
    let gltf: Gltf = serde_json::from_value(doc).expect("fixture gltf");
    let mut glb = Glb::new();
    glb.set_json(&gltf).expect("fixture json");
    glb.set_bin(bin);

    let mut container = B3dm::new(1, glb.to_bytes());
    container.feature_table_json = Bytes::from_static(FEATURE_TABLE);
    container.to_bytes().to_vec()
}

/// Parse a tile back into its container, payload and document.
pub fn open_tile(data: &[u8]) -> (B3dm, Glb, Gltf) {
    let container = B3dm::parse(Bytes::copy_from_slice(data)).expect("parse b3dm");
    let glb = Glb::parse(container.payload.clone()).expect("parse glb");
    let gltf = Gltf::from_slice(glb.json().expect("json chunk")).expect("parse gltf");
    (container, glb, gltf)
}

/// Bytes of the image at `index`.
pub fn image_bytes(data: &[u8], index: usize) -> Vec<u8> {
    let (_, glb, gltf) = open_tile(data);
    let view = &gltf.buffer_views()[gltf.images()[index].buffer_view.expect("buffer view")];
    glb.bin().expect("bin chunk")[view.offset()..view.end()].to_vec()
}

/// Check the layout invariants of a rebuilt tile.
pub fn assert_valid_tile(data: &[u8]) {
    let (container, glb, gltf) = open_tile(data);
    assert_eq!(container.declared_length as usize, data.len());
    assert_eq!(glb.declared_length as usize, container.payload.len());

    let bin = glb.bin().expect("bin chunk");
    let buffer_len = gltf.buffers.as_ref().expect("buffers")[0].byte_length;
    assert_eq!(buffer_len, bin.len());

    let mut ranges: Vec<(usize, usize)> = gltf
        .buffer_views()
        .iter()
        .map(|v| (v.offset(), v.end()))
        .collect();
    ranges.sort();
    for (start, end) in &ranges {
        assert_eq!(start % 4, 0, "view at {} not aligned", start);
        assert!(*end <= buffer_len, "view ends at {} past {}", end, buffer_len);
    }
    for pair in ranges.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "views overlap: {:?}", pair);
    }
}

/// Write `data` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, data: &[u8]) {
    let path = dir.join(name);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    std::fs::write(path, data).expect("write fixture");
}
