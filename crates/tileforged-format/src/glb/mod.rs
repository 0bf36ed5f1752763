//! Binary glTF (GLB) payload.
//!
//! A GLB is a 12-byte header (`glTF`, version, total length) followed by
//! chunks. Each chunk is `length: u32`, `type: [u8; 4]`, `length` body bytes,
//! then padding to the next 4-byte boundary. Padding is not counted in
//! `length`; its fill byte depends on the chunk type.

mod reader;
mod writer;

use crate::{Error, Result};
use bytes::Bytes;

/// Payload magic.
pub const MAGIC: [u8; 4] = *b"glTF";

/// Size of the GLB header.
pub const HEADER_LEN: usize = 12;

/// Size of a chunk header (length + type).
pub const CHUNK_HEADER_LEN: usize = 8;

/// Four-character chunk type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkKind(pub [u8; 4]);

impl ChunkKind {
    pub const JSON: Self = Self(*b"JSON");
    pub const BIN: Self = Self(*b"BIN\0");

    /// Byte used to pad this chunk's body to 4-byte alignment.
    ///
    /// JSON must be padded with spaces so the chunk stays valid JSON; all
    /// binary chunks are padded with zeros.
    pub fn padding_byte(&self) -> u8 {
        if *self == Self::JSON {
            b' '
        } else {
            0
        }
    }

    /// Printable tag, without trailing NULs.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0)
            .map(|s| s.trim_end_matches('\0'))
            .unwrap_or("????")
    }
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One GLB chunk, body only (padding stripped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: ChunkKind,
    pub data: Bytes,
}

impl Chunk {
    pub fn new(kind: ChunkKind, data: impl Into<Bytes>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }
}

/// Parsed GLB payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glb {
    /// GLB container version (2 for glTF 2.0).
    pub version: u32,
    /// Total length from the header, as read.
    pub declared_length: u32,
    /// Chunks in file order.
    pub chunks: Vec<Chunk>,
    /// Bytes after the declared GLB length (alignment filler added by the
    /// enclosing container). Written back verbatim after the chunks.
    pub trailer: Bytes,
}

impl Glb {
    /// Create an empty version-2 payload.
    pub fn new() -> Self {
        Self {
            version: 2,
            declared_length: 0,
            chunks: Vec::new(),
            trailer: Bytes::new(),
        }
    }

    /// Find the first chunk of the given kind.
    pub fn chunk(&self, kind: ChunkKind) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.kind == kind)
    }

    /// Body of the JSON chunk.
    pub fn json(&self) -> Result<&Bytes> {
        self.chunk(ChunkKind::JSON)
            .map(|c| &c.data)
            .ok_or(Error::MissingChunk(ChunkKind::JSON))
    }

    /// Body of the BIN chunk.
    pub fn bin(&self) -> Result<&Bytes> {
        self.chunk(ChunkKind::BIN)
            .map(|c| &c.data)
            .ok_or(Error::MissingChunk(ChunkKind::BIN))
    }

    /// Replace the body of the first chunk of `kind`, appending a new chunk
    /// if none exists.
    pub fn set_chunk(&mut self, kind: ChunkKind, data: impl Into<Bytes>) {
        let data = data.into();
        match self.chunks.iter_mut().find(|c| c.kind == kind) {
            Some(chunk) => chunk.data = data,
            None => self.chunks.push(Chunk { kind, data }),
        }
    }
}

impl Default for Glb {
    fn default() -> Self {
        Self::new()
    }
}
