//! Batched 3D Model (b3dm) container.
//!
//! A b3dm tile is a 28-byte header followed by four opaque sections (feature
//! table JSON/binary, batch table JSON/binary) and an embedded GLB payload.
//! The sections are carried through untouched; only the payload is ever
//! replaced.

mod reader;
mod writer;

use bytes::Bytes;

/// Container magic.
pub const MAGIC: [u8; 4] = *b"b3dm";

/// Size of the fixed header (magic + six u32 fields).
pub const HEADER_LEN: usize = 28;

/// Parsed b3dm container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct B3dm {
    /// Container version (1 for every tile we have seen).
    pub version: u32,
    /// `byteLength` as found in the header. Informational only; the writer
    /// always recomputes it.
    pub declared_length: u32,
    /// Feature table JSON bytes.
    pub feature_table_json: Bytes,
    /// Feature table binary bytes.
    pub feature_table_bin: Bytes,
    /// Batch table JSON bytes.
    pub batch_table_json: Bytes,
    /// Batch table binary bytes.
    pub batch_table_bin: Bytes,
    /// Embedded GLB payload (everything after the tables).
    pub payload: Bytes,
}

impl B3dm {
    /// Build a container around a payload with empty tables.
    pub fn new(version: u32, payload: impl Into<Bytes>) -> Self {
        Self {
            version,
            declared_length: 0,
            feature_table_json: Bytes::new(),
            feature_table_bin: Bytes::new(),
            batch_table_json: Bytes::new(),
            batch_table_bin: Bytes::new(),
            payload: payload.into(),
        }
    }

    /// Total of the four table section lengths.
    pub fn tables_len(&self) -> usize {
        self.feature_table_json.len()
            + self.feature_table_bin.len()
            + self.batch_table_json.len()
            + self.batch_table_bin.len()
    }

    /// Length the container will have when written.
    pub fn byte_length(&self) -> usize {
        HEADER_LEN + self.tables_len() + self.payload.len()
    }

    /// Replace the payload, keeping the tables.
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }
}
