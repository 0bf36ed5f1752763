//! Tile inspection.
//!
//! Reports the layout of a tile and every image embedded in it without
//! modifying anything. Image headers are read for dimensions only; pixel
//! data is never decoded.

use std::io::Cursor;

use bytes::Bytes;
use image::ImageReader;
use serde::Serialize;
use tileforged_format::{B3dm, ChunkKind, Glb, Gltf};

use crate::Result;

/// Summary of one tile.
#[derive(Debug, Clone, Serialize)]
pub struct TileInventory {
    pub version: u32,
    /// Actual file size in bytes.
    pub file_size: usize,
    /// `byteLength` as declared in the header.
    pub declared_length: u32,
    pub feature_table_json: usize,
    pub feature_table_bin: usize,
    pub batch_table_json: usize,
    pub batch_table_bin: usize,
    /// Size of the embedded GLB.
    pub payload_size: usize,
    /// Size of the GLB binary chunk, if present.
    pub bin_size: Option<usize>,
    pub buffer_views: usize,
    pub images: Vec<ImageInfo>,
}

impl TileInventory {
    /// Total bytes held by images stored in buffer views.
    pub fn image_bytes(&self) -> usize {
        self.images.iter().map(|i| i.byte_length).sum()
    }
}

/// One image stored in a buffer view.
#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub index: usize,
    pub name: String,
    pub byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Why the image could not be read, if it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageInfo {
    fn new(index: usize, name: Option<&str>, byte_length: usize, mime_type: Option<&str>) -> Self {
        Self {
            index,
            name: name
                .map(str::to_string)
                .unwrap_or_else(|| format!("image_{}", index)),
            byte_length,
            mime_type: mime_type.map(str::to_string),
            format: None,
            width: None,
            height: None,
            error: None,
        }
    }

    fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// `WxH`, or `?` when unknown.
    pub fn dimensions(&self) -> String {
        match (self.width, self.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            _ => "?".to_string(),
        }
    }
}

/// Inspect a tile held in memory.
///
/// Only container and payload framing errors fail the call; a broken image
/// is reported in its [`ImageInfo::error`].
pub fn inspect(data: Bytes) -> Result<TileInventory> {
    let file_size = data.len();
    let container = B3dm::parse(data)?;
    let glb = Glb::parse(container.payload.clone())?;

    let mut inventory = TileInventory {
        version: container.version,
        file_size,
        declared_length: container.declared_length,
        feature_table_json: container.feature_table_json.len(),
        feature_table_bin: container.feature_table_bin.len(),
        batch_table_json: container.batch_table_json.len(),
        batch_table_bin: container.batch_table_bin.len(),
        payload_size: container.payload.len(),
        bin_size: glb.chunk(ChunkKind::BIN).map(|c| c.data.len()),
        buffer_views: 0,
        images: Vec::new(),
    };

    let Some(json) = glb.chunk(ChunkKind::JSON) else {
        return Ok(inventory);
    };
    let gltf = Gltf::from_slice(&json.data)?;
    let views = gltf.buffer_views();
    inventory.buffer_views = views.len();

    let bin: &[u8] = glb.chunk(ChunkKind::BIN).map(|c| &c.data[..]).unwrap_or(&[]);

    for (index, image) in gltf.images().iter().enumerate() {
        let Some(view_idx) = image.buffer_view else {
            continue;
        };
        let Some(view) = views.get(view_idx) else {
            inventory.images.push(
                ImageInfo::new(index, image.name.as_deref(), 0, image.mime_type.as_deref())
                    .with_error(format!("buffer view {} does not exist", view_idx)),
            );
            continue;
        };

        let info = ImageInfo::new(
            index,
            image.name.as_deref(),
            view.byte_length,
            image.mime_type.as_deref(),
        );

        let info = match bin.get(view.offset()..view.end()) {
            Some(bytes) => probe_image(bytes, info),
            None => info.with_error(format!(
                "buffer view {} ends at {} past binary chunk of {} bytes",
                view_idx,
                view.end(),
                bin.len()
            )),
        };
        inventory.images.push(info);
    }

    Ok(inventory)
}

fn probe_image(bytes: &[u8], mut info: ImageInfo) -> ImageInfo {
    let reader = match ImageReader::new(Cursor::new(bytes)).with_guessed_format() {
        Ok(reader) => reader,
        Err(e) => return info.with_error(e.to_string()),
    };

    let Some(format) = reader.format() else {
        return info.with_error("unrecognized image encoding");
    };
    info.format = Some(format!("{:?}", format).to_uppercase());

    match reader.into_dimensions() {
        Ok((width, height)) => {
            info.width = Some(width);
            info.height = Some(height);
            info
        }
        Err(e) => info.with_error(e.to_string()),
    }
}
