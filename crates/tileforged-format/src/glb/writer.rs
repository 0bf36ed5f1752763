//! GLB chunk builder.

use super::{ChunkKind, Glb, CHUNK_HEADER_LEN, HEADER_LEN, MAGIC};
use crate::{gltf::Gltf, padding_for, Result};
use bytes::{BufMut, Bytes, BytesMut};

impl Glb {
    /// Length of the GLB proper (header + padded chunks), excluding the
    /// trailer.
    pub fn byte_length(&self) -> usize {
        HEADER_LEN
            + self
                .chunks
                .iter()
                .map(|c| CHUNK_HEADER_LEN + c.data.len() + padding_for(c.data.len()))
                .sum::<usize>()
    }

    /// Serialize the payload.
    ///
    /// Each chunk header carries the unpadded body length; the body is then
    /// padded with the chunk kind's fill byte. The header total length is
    /// recomputed from the chunks.
    pub fn to_bytes(&self) -> Bytes {
        let total = self.byte_length();
        let mut buf = BytesMut::with_capacity(total + self.trailer.len());

        buf.put_slice(&MAGIC);
        buf.put_u32_le(self.version);
        buf.put_u32_le(total as u32);

        for chunk in &self.chunks {
            buf.put_u32_le(chunk.data.len() as u32);
            buf.put_slice(&chunk.kind.0);
            buf.put_slice(&chunk.data);
            buf.put_bytes(chunk.kind.padding_byte(), padding_for(chunk.data.len()));
        }

        debug_assert_eq!(buf.len(), total);
        buf.put_slice(&self.trailer);
        buf.freeze()
    }

    /// Serialize `gltf` into the JSON chunk.
    ///
    /// The JSON is written compactly and space-padded inside the body, so the
    /// declared chunk length is itself 4-byte aligned.
    pub fn set_json(&mut self, gltf: &Gltf) -> Result<()> {
        let mut json = serde_json::to_vec(gltf)?;
        let pad = padding_for(json.len());
        json.resize(json.len() + pad, b' ');
        self.set_chunk(ChunkKind::JSON, json);
        Ok(())
    }

    /// Replace the BIN chunk body.
    pub fn set_bin(&mut self, data: impl Into<Bytes>) {
        self.set_chunk(ChunkKind::BIN, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glb::Chunk;

    #[test]
    fn test_json_chunk_padded_with_spaces() {
        let mut glb = Glb::new();
        glb.chunks
            .push(Chunk::new(ChunkKind::JSON, Bytes::from_static(b"{\"a\":1}")));

        let out = glb.to_bytes();
        // header + chunk header + 7 body bytes + 1 pad
        assert_eq!(out.len(), 12 + 8 + 8);
        assert_eq!(&out[12..16], &7u32.to_le_bytes());
        assert_eq!(&out[16..20], b"JSON");
        assert_eq!(&out[20..27], b"{\"a\":1}");
        assert_eq!(out[27], 0x20);
    }

    #[test]
    fn test_bin_chunk_padded_with_zeros() {
        let mut glb = Glb::new();
        glb.chunks
            .push(Chunk::new(ChunkKind::BIN, Bytes::from_static(&[0xff; 5])));

        let out = glb.to_bytes();
        assert_eq!(out.len(), 12 + 8 + 8);
        assert_eq!(&out[12..16], &5u32.to_le_bytes());
        assert_eq!(&out[25..28], &[0, 0, 0]);
    }

    #[test]
    fn test_total_length_recomputed() {
        let mut glb = Glb::new();
        glb.declared_length = 9999;
        glb.chunks.push(Chunk::new(ChunkKind::JSON, Bytes::from_static(b"{}")));
        glb.chunks.push(Chunk::new(ChunkKind::BIN, Bytes::from_static(&[1; 6])));

        let out = glb.to_bytes();
        let total = u32::from_le_bytes(out[8..12].try_into().unwrap()) as usize;
        assert_eq!(total, out.len());
        assert_eq!(total, 12 + (8 + 4) + (8 + 8));
    }

    #[test]
    fn test_trailer_written_after_chunks() {
        let mut glb = Glb::new();
        glb.chunks.push(Chunk::new(ChunkKind::JSON, Bytes::from_static(b"{}  ")));
        glb.trailer = Bytes::from_static(b"    ");

        let out = glb.to_bytes();
        let total = u32::from_le_bytes(out[8..12].try_into().unwrap()) as usize;
        assert_eq!(total, 24);
        assert_eq!(out.len(), 28);
    }

    #[test]
    fn test_round_trip_byte_identical() {
        let mut glb = Glb::new();
        glb.chunks.push(Chunk::new(ChunkKind::JSON, Bytes::from_static(b"{\"asset\":{\"version\":\"2.0\"}}")));
        glb.chunks.push(Chunk::new(ChunkKind::BIN, Bytes::from_static(&[1, 2, 3, 4, 5, 6, 7])));

        let first = glb.to_bytes();
        let reparsed = Glb::parse(first.clone()).unwrap();
        assert_eq!(reparsed.chunks, glb.chunks);
        assert_eq!(reparsed.to_bytes(), first);
    }

    #[test]
    fn test_set_json_aligns_body() {
        let mut glb = Glb::new();
        let gltf: Gltf = serde_json::from_str(r#"{"asset":{"version":"2.0"}}"#).unwrap();
        glb.set_json(&gltf).unwrap();

        let body = glb.json().unwrap();
        assert_eq!(body.len() % 4, 0);
        let reparsed = Gltf::from_slice(body).unwrap();
        assert_eq!(reparsed, gltf);
    }
}
