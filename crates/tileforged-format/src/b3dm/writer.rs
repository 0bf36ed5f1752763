//! b3dm container writer.

use super::{B3dm, MAGIC};
use bytes::{BufMut, Bytes, BytesMut};

impl B3dm {
    /// Serialize the container.
    ///
    /// Every length field, including `byteLength`, is derived from the bytes
    /// actually written. `declared_length` is ignored.
    pub fn to_bytes(&self) -> Bytes {
        let total = self.byte_length();
        let mut buf = BytesMut::with_capacity(total);

        buf.put_slice(&MAGIC);
        buf.put_u32_le(self.version);
        buf.put_u32_le(total as u32);
        buf.put_u32_le(self.feature_table_json.len() as u32);
        buf.put_u32_le(self.feature_table_bin.len() as u32);
        buf.put_u32_le(self.batch_table_json.len() as u32);
        buf.put_u32_le(self.batch_table_bin.len() as u32);

        buf.put_slice(&self.feature_table_json);
        buf.put_slice(&self.feature_table_bin);
        buf.put_slice(&self.batch_table_json);
        buf.put_slice(&self.batch_table_bin);
        buf.put_slice(&self.payload);

        debug_assert_eq!(buf.len(), total);
        buf.freeze()
    }
}
