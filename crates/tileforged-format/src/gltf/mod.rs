//! glTF JSON metadata, limited to what addresses the binary chunk.
//!
//! Only `buffers`, `bufferViews` and `images` are modeled. Everything else
//! (accessors, meshes, materials, extensions, unknown properties on the
//! modeled objects) is kept in `extra` maps and serialized back unchanged.

use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level glTF document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gltf {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffers: Option<Vec<Buffer>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_views: Option<Vec<BufferView>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Image>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    #[serde(default)]
    pub byte_length: usize,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    #[serde(default)]
    pub buffer: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_offset: Option<usize>,

    pub byte_length: usize,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BufferView {
    /// Offset into the buffer, defaulting to 0 when absent.
    pub fn offset(&self) -> usize {
        self.byte_offset.unwrap_or(0)
    }

    /// One past the last byte addressed by this view, or `None` if that
    /// does not fit in a `usize`.
    pub fn checked_end(&self) -> Option<usize> {
        self.offset().checked_add(self.byte_length)
    }

    /// Like [`checked_end`](Self::checked_end), saturating at `usize::MAX`.
    pub fn end(&self) -> usize {
        self.offset().saturating_add(self.byte_length)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Gltf {
    /// Parse a JSON chunk body.
    ///
    /// Trailing padding is tolerated whether it is spaces or NULs; some
    /// exporters pad the JSON chunk with zeros.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let end = data
            .iter()
            .rposition(|&b| b != 0 && b != b' ')
            .map_or(0, |i| i + 1);
        Ok(serde_json::from_slice(&data[..end])?)
    }

    /// Buffer views, or an empty slice.
    pub fn buffer_views(&self) -> &[BufferView] {
        self.buffer_views.as_deref().unwrap_or_default()
    }

    /// Images, or an empty slice.
    pub fn images(&self) -> &[Image] {
        self.images.as_deref().unwrap_or_default()
    }
}
