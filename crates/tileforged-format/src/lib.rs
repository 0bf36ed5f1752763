//! Tileforged-Format: b3dm containers, GLB chunks and the glTF metadata subset
//!
//! This crate provides the binary framing layer for tileforged. It knows
//! nothing about images; it only splits tiles into their parts and puts them
//! back together with correct lengths and padding.
//!
//! # Modules
//!
//! - `b3dm` - Batched 3D Model container (28-byte header, feature/batch tables)
//! - `glb` - Binary glTF payload (12-byte header, JSON/BIN chunks)
//! - `gltf` - The part of the glTF JSON that addresses the binary chunk
//!
//! # Layout
//!
//! ```text
//! b3dm header (28) | feature table json | feature table bin | batch table json | batch table bin | glb
//!                                                                                                  |
//!                        glTF header (12) | JSON chunk (8 + body + pad) | BIN chunk (8 + body + pad)
//! ```
//!
//! All integers are little-endian.

pub mod b3dm;
pub mod error;
pub mod glb;
pub mod gltf;

pub use b3dm::B3dm;
pub use error::{Error, Result};
pub use glb::{Chunk, ChunkKind, Glb};
pub use gltf::Gltf;

/// Number of zero/space bytes needed to bring `len` up to a multiple of 4.
#[inline]
pub fn padding_for(len: usize) -> usize {
    (4 - len % 4) % 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(0), 0);
        assert_eq!(padding_for(1), 3);
        assert_eq!(padding_for(7), 1);
        assert_eq!(padding_for(8), 0);
        assert_eq!(padding_for(10), 2);
    }
}
