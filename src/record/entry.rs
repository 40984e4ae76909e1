//! Record encoding
//!
//! Defines a single heap record and its byte layout.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{HeapError, Result};

use super::{encoded_len, CHECKSUM_SIZE, MAX_KEY_SIZE, MAX_VALUE_SIZE, VALUE_LEN_SIZE};

/// A single key/value record as stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    key: String,
    value: String,
    checksum: u32,
}

impl Record {
    /// Build a record, computing its checksum.
    ///
    /// Callers validate sizes first; see [`crate::validate`].
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        debug_assert!(!key.is_empty() && key.len() <= MAX_KEY_SIZE);
        debug_assert!(value.len() <= MAX_VALUE_SIZE);

        let checksum = Self::compute_checksum(key.as_bytes(), value.as_bytes());
        Self {
            key,
            value,
            checksum,
        }
    }

    /// CRC32 over key bytes followed by value bytes
    pub fn compute_checksum(key: &[u8], value: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(key);
        hasher.update(value);
        hasher.finalize()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Consume the record, keeping only the value
    pub fn into_value(self) -> String {
        self.value
    }

    /// Consume the record into its key and value
    pub fn into_parts(self) -> (String, String) {
        (self.key, self.value)
    }

    /// Number of bytes this record occupies on disk
    pub fn encoded_len(&self) -> usize {
        encoded_len(self.key.len(), self.value.len())
    }

    /// Encode to the on-disk layout:
    /// `[key_len u8][key][value_len u32 LE][value][crc32 u32 LE]`
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u8(self.key.len() as u8);
        buf.put_slice(self.key.as_bytes());
        buf.put_u32_le(self.value.len() as u32);
        buf.put_slice(self.value.as_bytes());
        buf.put_u32_le(self.checksum);
        buf.freeze()
    }

    /// Decode exactly one record from `data`.
    ///
    /// `offset` is the record's position in the file and is only used for
    /// error reporting. Any structural problem, trailing byte, checksum
    /// mismatch or non-UTF-8 payload is reported as `DataCorruption`.
    pub fn decode(data: &[u8], offset: u64) -> Result<Self> {
        let mut rest = data;

        if !rest.has_remaining() {
            return Err(truncated(offset, "key length"));
        }
        let key_len = rest.get_u8() as usize;
        if key_len == 0 {
            return Err(HeapError::corruption(offset, "zero-length key"));
        }

        if rest.remaining() < key_len {
            return Err(truncated(offset, "key"));
        }
        let (key_bytes, tail) = rest.split_at(key_len);
        rest = tail;

        if rest.remaining() < VALUE_LEN_SIZE {
            return Err(truncated(offset, "value length"));
        }
        let value_len = rest.get_u32_le() as usize;
        if value_len > MAX_VALUE_SIZE {
            return Err(HeapError::corruption(
                offset,
                format!("value length {} exceeds {}", value_len, MAX_VALUE_SIZE),
            ));
        }

        if rest.remaining() < value_len {
            return Err(truncated(offset, "value"));
        }
        let (value_bytes, tail) = rest.split_at(value_len);
        rest = tail;

        if rest.remaining() < CHECKSUM_SIZE {
            return Err(truncated(offset, "checksum"));
        }
        let stored = rest.get_u32_le();

        if rest.has_remaining() {
            return Err(HeapError::corruption(
                offset,
                format!("{} unexpected trailing bytes", rest.remaining()),
            ));
        }

        let computed = Self::compute_checksum(key_bytes, value_bytes);
        if computed != stored {
            return Err(HeapError::corruption(
                offset,
                format!(
                    "checksum mismatch: stored {:#010x}, computed {:#010x}",
                    stored, computed
                ),
            ));
        }

        let key = std::str::from_utf8(key_bytes)
            .map_err(|e| HeapError::corruption(offset, format!("key is not UTF-8: {}", e)))?;
        let value = std::str::from_utf8(value_bytes)
            .map_err(|e| HeapError::corruption(offset, format!("value is not UTF-8: {}", e)))?;

        Ok(Self {
            key: key.to_owned(),
            value: value.to_owned(),
            checksum: stored,
        })
    }
}

fn truncated(offset: u64, field: &str) -> HeapError {
    HeapError::corruption(offset, format!("truncated record: missing {}", field))
}
