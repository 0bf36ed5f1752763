//! GLB chunk parser.

use super::{Chunk, ChunkKind, Glb, CHUNK_HEADER_LEN, HEADER_LEN, MAGIC};
use crate::{padding_for, Error, Result};
use bytes::{Buf, Bytes};

impl Glb {
    /// Parse a GLB payload.
    ///
    /// Chunks are read until the cursor reaches the header's total length or
    /// the end of the buffer, whichever comes first.
    pub fn parse(data: Bytes) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(Error::Truncated {
                what: "GLB header",
                need: HEADER_LEN,
                have: data.len(),
            });
        }

        if data[..4] != MAGIC {
            return Err(Error::format(format!(
                "expected glTF magic, found {:?}",
                String::from_utf8_lossy(&data[..4])
            )));
        }

        let mut header = &data[4..HEADER_LEN];
        let version = header.get_u32_le();
        let declared_length = header.get_u32_le();

        let end = (declared_length as usize).min(data.len());
        let mut chunks = Vec::new();
        let mut pos = HEADER_LEN;

        while pos < end {
            if pos + CHUNK_HEADER_LEN > data.len() {
                return Err(Error::Truncated {
                    what: "GLB chunk header",
                    need: pos + CHUNK_HEADER_LEN,
                    have: data.len(),
                });
            }

            let mut chunk_header = &data[pos..pos + CHUNK_HEADER_LEN];
            let length = chunk_header.get_u32_le() as usize;
            let kind = ChunkKind([
                chunk_header[0],
                chunk_header[1],
                chunk_header[2],
                chunk_header[3],
            ]);

            let body_start = pos + CHUNK_HEADER_LEN;
            let available = data.len() - body_start;
            if length > available {
                return Err(Error::TruncatedChunk {
                    kind,
                    offset: pos,
                    declared: length,
                    available,
                });
            }

            chunks.push(Chunk {
                kind,
                data: data.slice(body_start..body_start + length),
            });

            pos = body_start + length + padding_for(length);
        }

        let trailer = if pos < data.len() {
            data.slice(pos..)
        } else {
            Bytes::new()
        };

        Ok(Self {
            version,
            declared_length,
            chunks,
            trailer,
        })
    }
}
