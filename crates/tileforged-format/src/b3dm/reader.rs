//! b3dm container reader.

use super::{B3dm, HEADER_LEN, MAGIC};
use crate::{Error, Result};
use bytes::{Buf, Bytes};

impl B3dm {
    /// Parse a container from fully buffered file contents.
    ///
    /// The header's `byteLength` is recorded but not checked against the
    /// buffer size, so tiles written by sloppy exporters still load.
    pub fn parse(data: Bytes) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(Error::Truncated {
                what: "b3dm header",
                need: HEADER_LEN,
                have: data.len(),
            });
        }

        if data[..4] != MAGIC {
            return Err(Error::format(format!(
                "expected b3dm magic, found {:?}",
                String::from_utf8_lossy(&data[..4])
            )));
        }

        let mut header = &data[4..HEADER_LEN];
        let version = header.get_u32_le();
        let declared_length = header.get_u32_le();
        let ft_json_len = header.get_u32_le() as usize;
        let ft_bin_len = header.get_u32_le() as usize;
        let bt_json_len = header.get_u32_le() as usize;
        let bt_bin_len = header.get_u32_le() as usize;

        let tables_end = HEADER_LEN + ft_json_len + ft_bin_len + bt_json_len + bt_bin_len;
        if tables_end > data.len() {
            return Err(Error::Truncated {
                what: "b3dm tables",
                need: tables_end,
                have: data.len(),
            });
        }

        let mut pos = HEADER_LEN;
        let mut take = |len: usize| {
            let section = data.slice(pos..pos + len);
            pos += len;
            section
        };

        let feature_table_json = take(ft_json_len);
        let feature_table_bin = take(ft_bin_len);
        let batch_table_json = take(bt_json_len);
        let batch_table_bin = take(bt_bin_len);
        let payload = data.slice(tables_end..);

        Ok(Self {
            version,
            declared_length,
            feature_table_json,
            feature_table_bin,
            batch_table_json,
            batch_table_bin,
            payload,
        })
    }
}
