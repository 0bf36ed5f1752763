//! Error types for tileforged-format.

use crate::glb::ChunkKind;
use thiserror::Error;

/// Result type for tileforged-format operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tileforged-format operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad magic tag or malformed structure.
    #[error("Invalid format: {0}")]
    Format(String),

    /// Fixed-size header or section runs past the end of the buffer.
    #[error("Truncated {what}: need {need} bytes, have {have}")]
    Truncated {
        what: &'static str,
        need: usize,
        have: usize,
    },

    /// A chunk's declared length runs past the end of the payload.
    #[error("Truncated {kind} chunk at offset {offset}: declared {declared} bytes, {available} available")]
    TruncatedChunk {
        kind: ChunkKind,
        offset: usize,
        declared: usize,
        available: usize,
    },

    /// The payload lacks a chunk the caller needs.
    #[error("Missing required chunk: {0}")]
    MissingChunk(ChunkKind),

    /// A buffer view addresses bytes outside the binary chunk.
    #[error("Buffer view {index} ends at {end}, past binary chunk length {len}")]
    ViewOutOfBounds { index: usize, end: usize, len: usize },

    /// Structure is valid but not something we handle.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// JSON chunk could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create an unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}
