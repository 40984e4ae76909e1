//! Input validation
//!
//! Size and encoding checks run before any mutation. Keys and values must
//! be UTF-8 without NUL bytes so that every stored string can cross the
//! C ABI as a NUL-terminated string.

use crate::error::{HeapError, Result};
use crate::record::{MAX_KEY_SIZE, MAX_VALUE_SIZE};

/// Check a key: 1..=255 bytes, no NUL
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > MAX_KEY_SIZE {
        return Err(HeapError::InvalidKeySize(key.len()));
    }
    reject_nul("key", key.as_bytes())
}

/// Check a value: 0..=65535 bytes, no NUL
pub fn validate_value(value: &str) -> Result<()> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(HeapError::InvalidValueSize(value.len()));
    }
    reject_nul("value", value.as_bytes())
}

/// Interpret raw bytes as a string, mapping bad UTF-8 to `InvalidEncoding`
pub fn str_from_bytes<'a>(what: &str, bytes: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(bytes)
        .map_err(|e| HeapError::InvalidEncoding(format!("{} is not valid UTF-8: {}", what, e)))
}

fn reject_nul(what: &str, bytes: &[u8]) -> Result<()> {
    match bytes.iter().position(|&b| b == 0) {
        Some(pos) => Err(HeapError::InvalidEncoding(format!(
            "{} contains a NUL byte at position {}",
            what, pos
        ))),
        None => Ok(()),
    }
}
