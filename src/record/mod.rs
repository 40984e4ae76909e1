//! Record Module
//!
//! The on-disk unit of persistence. Every `set` appends exactly one record;
//! records are never rewritten in place.
//!
//! ## Responsibilities
//! - Encode/decode records with a CRC32 checksum
//! - Sequential scanning of the heap file
//! - Append-only writes with configurable sync
//! - Replay on open to rebuild the key index
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Record 1                                                     │
//! │ ┌─────────┬─────────┬───────────┬─────────┬────────────────┐ │
//! │ │KeyLen(1)│ Key     │ValLen(4LE)│ Value   │ CRC32 (4LE)    │ │
//! │ └─────────┴─────────┴───────────┴─────────┴────────────────┘ │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Record 2 ...                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no file header and no padding. The CRC covers the key bytes
//! followed by the value bytes.

mod entry;
mod file;
mod reader;
mod replay;

pub use entry::Record;
pub use file::HeapFile;
pub use reader::{RecordReader, ScannedRecord};
pub use replay::{HeapReplay, ReplayStats};

// =============================================================================
// Format Constants
// =============================================================================

/// Maximum key size in bytes (fits the 1-byte length prefix)
pub const MAX_KEY_SIZE: usize = 255;

/// Maximum value size in bytes
pub const MAX_VALUE_SIZE: usize = 65_535;

/// Size of the key length prefix
pub const KEY_LEN_SIZE: usize = 1;

/// Size of the value length prefix
pub const VALUE_LEN_SIZE: usize = 4;

/// Size of the trailing checksum
pub const CHECKSUM_SIZE: usize = 4;

/// Smallest possible record: 1-byte key, empty value
pub const MIN_RECORD_SIZE: usize = KEY_LEN_SIZE + 1 + VALUE_LEN_SIZE + CHECKSUM_SIZE;

/// Largest possible record
pub const MAX_RECORD_SIZE: usize =
    KEY_LEN_SIZE + MAX_KEY_SIZE + VALUE_LEN_SIZE + MAX_VALUE_SIZE + CHECKSUM_SIZE;

/// Encoded size of a record with the given key and value lengths
pub fn encoded_len(key_len: usize, value_len: usize) -> usize {
    KEY_LEN_SIZE + key_len + VALUE_LEN_SIZE + value_len + CHECKSUM_SIZE
}

/// Location of a record inside the heap file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLocation {
    /// Byte offset of the record's first byte
    pub offset: u64,

    /// Total encoded length of the record
    pub len: u32,
}

impl RecordLocation {
    pub fn new(offset: u64, len: u32) -> Self {
        Self { offset, len }
    }

    /// Offset one past the record's last byte
    pub fn end(&self) -> u64 {
        self.offset + self.len as u64
    }
}
