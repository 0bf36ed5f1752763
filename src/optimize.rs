//! Single-tile optimization.
//!
//! Runs the whole read → remap → rebuild chain for one b3dm file held in
//! memory and reports what happened as a [`TileOutcome`].

use bytes::Bytes;
use tileforged_format::{B3dm, ChunkKind, Glb, Gltf};

use crate::remap::{remap_buffer_views, ImageReport, RemapOutcome};
use crate::transcode::{transcode, TranscodeSettings};
use crate::Result;

/// Why a tile was left as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    /// No image is stored in a buffer view.
    NoImages,
    /// Images were re-encoded but none came out smaller.
    NoSavings,
    /// The payload lacks a JSON or BIN chunk.
    MissingChunk(ChunkKind),
}

impl std::fmt::Display for PassReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoImages => write!(f, "no images"),
            Self::NoSavings => write!(f, "no images to optimize"),
            Self::MissingChunk(kind) => write!(f, "missing required chunk: {}", kind),
        }
    }
}

/// Result of optimizing one tile.
#[derive(Debug)]
pub enum TileOutcome {
    /// The rebuilt container.
    Optimized {
        data: Bytes,
        images: Vec<ImageReport>,
    },
    /// Nothing worth writing; the original bytes should be kept.
    Unchanged(PassReason),
}

/// Optimize the textures of one b3dm tile.
///
/// # Arguments
///
/// * `data` - Complete file contents
/// * `settings` - Transcode parameters applied to every image
///
/// # Errors
///
/// Any framing, metadata or image decoding problem. Callers keep the
/// original file in that case.
pub fn optimize_tile(data: Bytes, settings: &TranscodeSettings) -> Result<TileOutcome> {
    let container = B3dm::parse(data)?;
    let mut glb = Glb::parse(container.payload.clone())?;

    let Some(json) = glb.chunk(ChunkKind::JSON) else {
        return Ok(TileOutcome::Unchanged(PassReason::MissingChunk(
            ChunkKind::JSON,
        )));
    };
    let Some(bin) = glb.chunk(ChunkKind::BIN) else {
        return Ok(TileOutcome::Unchanged(PassReason::MissingChunk(
            ChunkKind::BIN,
        )));
    };

    let gltf = Gltf::from_slice(&json.data)?;

    let outcome = remap_buffer_views(&gltf, &bin.data, |bytes, image| {
        transcode(bytes, image.mime_type.as_deref(), settings)
    })?;

    let (gltf, bin, images) = match outcome {
        RemapOutcome::Skipped => return Ok(TileOutcome::Unchanged(PassReason::NoImages)),
        RemapOutcome::Remapped { gltf, bin, images } => (gltf, bin, images),
    };

    if !images.iter().any(ImageReport::is_smaller) {
        return Ok(TileOutcome::Unchanged(PassReason::NoSavings));
    }

    glb.set_json(&gltf)?;
    glb.set_bin(bin);

    let rebuilt = container.with_payload(glb.to_bytes()).to_bytes();
    Ok(TileOutcome::Optimized {
        data: rebuilt,
        images,
    })
}

/// Parse and immediately re-serialize a tile without touching its content.
///
/// Useful for normalizing padding and stale length fields.
pub fn rewrite_tile(data: Bytes) -> Result<Bytes> {
    let container = B3dm::parse(data)?;
    let glb = Glb::parse(container.payload.clone())?;
    Ok(container.with_payload(glb.to_bytes()).to_bytes())
}
