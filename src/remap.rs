//! Buffer view remapping.
//!
//! Rebuilds the GLB binary chunk after image payloads change size. Every
//! buffer view is copied (or re-encoded, for image views) into a fresh blob
//! in ascending order of its original byte offset, each one starting on a
//! 4-byte boundary, and the view table is rewritten to match.
//!
//! ```text
//! original:  | mesh (0..4000) | img0 (4000..900000) | idx (900000..903000) |
//! remapped:  | mesh (0..4000) | img0' (4000..130004) |pad| idx (130008..133008) |
//! ```
//!
//! Either every image is re-encoded or the tile is left alone: a failure on
//! any image aborts the whole remap.

use std::collections::HashMap;

use bytes::{BufMut, Bytes, BytesMut};
use tileforged_format::gltf::{Gltf, Image};
use tileforged_format::{padding_for, Error as FormatError};

use crate::transcode::Transcoded;
use crate::Result;

/// Reverse index from buffer view to the image stored in it.
#[derive(Debug, Default)]
pub struct ImageIndex {
    by_view: HashMap<usize, usize>,
}

impl ImageIndex {
    /// Build the index for a document.
    ///
    /// Images without a `bufferView` (external URIs, data URIs) are ignored.
    /// Two images claiming the same view, or an image pointing at a view that
    /// does not exist, make the document invalid.
    pub fn build(gltf: &Gltf) -> Result<Self> {
        let view_count = gltf.buffer_views().len();
        let mut by_view = HashMap::new();

        for (image_idx, image) in gltf.images().iter().enumerate() {
            let Some(view) = image.buffer_view else {
                continue;
            };
            if view >= view_count {
                return Err(FormatError::format(format!(
                    "image {} references buffer view {} of {}",
                    image_idx, view, view_count
                ))
                .into());
            }
            if let Some(previous) = by_view.insert(view, image_idx) {
                return Err(FormatError::format(format!(
                    "images {} and {} share buffer view {}",
                    previous, image_idx, view
                ))
                .into());
            }
        }

        Ok(Self { by_view })
    }

    /// Image stored in the given buffer view, if any.
    pub fn image_for(&self, view: usize) -> Option<usize> {
        self.by_view.get(&view).copied()
    }

    /// Number of image-backed views.
    pub fn len(&self) -> usize {
        self.by_view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_view.is_empty()
    }
}

/// What happened to one image during a remap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReport {
    /// Index into `images[]`.
    pub image: usize,
    /// Image name, if the document gives one.
    pub name: Option<String>,
    /// Bytes before transcoding.
    pub original_len: usize,
    /// Bytes after transcoding.
    pub new_len: usize,
    /// Final pixel width.
    pub width: u32,
    /// Final pixel height.
    pub height: u32,
}

impl ImageReport {
    pub fn saved(&self) -> usize {
        self.original_len.saturating_sub(self.new_len)
    }

    pub fn is_smaller(&self) -> bool {
        self.new_len < self.original_len
    }
}

/// Result of remapping a document.
#[derive(Debug)]
pub enum RemapOutcome {
    /// No image lives in a buffer view; the payload should pass through
    /// unchanged.
    Skipped,
    /// Images were re-encoded and the blob rebuilt.
    Remapped {
        gltf: Gltf,
        bin: Bytes,
        images: Vec<ImageReport>,
    },
}

/// Re-encode every image-backed buffer view and rebuild the binary chunk.
///
/// # Arguments
///
/// * `gltf` - Document whose `bufferViews` address `bin`
/// * `bin` - Body of the GLB BIN chunk (buffer 0)
/// * `encode` - Called once per image view with the original bytes and the
///   image; its output replaces the view's contents
///
/// The input document is not modified; on success a rewritten copy is
/// returned together with the new blob.
pub fn remap_buffer_views<F>(gltf: &Gltf, bin: &[u8], mut encode: F) -> Result<RemapOutcome>
where
    F: FnMut(&[u8], &Image) -> Result<Transcoded>,
{
    let views = gltf.buffer_views();
    let images = gltf.images();
    if views.is_empty() || images.is_empty() {
        return Ok(RemapOutcome::Skipped);
    }

    let index = ImageIndex::build(gltf)?;
    if index.is_empty() {
        return Ok(RemapOutcome::Skipped);
    }

    for (i, view) in views.iter().enumerate() {
        if view.buffer != 0 {
            return Err(FormatError::unsupported(format!(
                "buffer view {} references buffer {}; only the GLB binary chunk is supported",
                i, view.buffer
            ))
            .into());
        }
        match view.checked_end() {
            Some(end) if end <= bin.len() => {}
            _ => {
                return Err(FormatError::ViewOutOfBounds {
                    index: i,
                    end: view.end(),
                    len: bin.len(),
                }
                .into())
            }
        }
    }

    // Physical order, ties broken by declaration order (sort_by_key is stable)
    let mut order: Vec<usize> = (0..views.len()).collect();
    order.sort_by_key(|&i| views[i].offset());

    let mut blob = BytesMut::with_capacity(bin.len());
    let mut placements = vec![(0usize, 0usize); views.len()];
    let mut reports = Vec::with_capacity(index.len());

    for view_idx in order {
        let view = &views[view_idx];
        let original = &bin[view.offset()..view.end()];
        let start = blob.len();

        let len = match index.image_for(view_idx) {
            Some(image_idx) => {
                let image = &images[image_idx];
                let transcoded =
                    encode(original, image).map_err(|e| e.in_image(image_idx))?;

                tracing::debug!(
                    "Image {} ({}): {} -> {} bytes, {}x{}",
                    image_idx,
                    image.name.as_deref().unwrap_or("unnamed"),
                    transcoded.original_len,
                    transcoded.new_len,
                    transcoded.width,
                    transcoded.height
                );

                blob.put_slice(&transcoded.data);
                reports.push(ImageReport {
                    image: image_idx,
                    name: image.name.clone(),
                    original_len: original.len(),
                    new_len: transcoded.data.len(),
                    width: transcoded.width,
                    height: transcoded.height,
                });
                transcoded.data.len()
            }
            None => {
                blob.put_slice(original);
                original.len()
            }
        };

        blob.put_bytes(0, padding_for(len));
        placements[view_idx] = (start, len);
    }

    let mut remapped = gltf.clone();
    if let Some(views) = remapped.buffer_views.as_mut() {
        for (view, &(offset, len)) in views.iter_mut().zip(&placements) {
            view.byte_offset = Some(offset);
            view.byte_length = len;
        }
    }
    if let Some(buffer) = remapped.buffers.as_mut().and_then(|b| b.first_mut()) {
        buffer.byte_length = blob.len();
    }

    reports.sort_by_key(|r| r.image);

    Ok(RemapOutcome::Remapped {
        gltf: remapped,
        bin: blob.freeze(),
        images: reports,
    })
}
