//! Error types for heapkv
//!
//! Provides a unified error type for all operations, plus a fieldless
//! [`ErrorKind`] whose numeric codes are shared with the C ABI.

use thiserror::Error;

use crate::record::{MAX_KEY_SIZE, MAX_VALUE_SIZE};

/// Result type alias using HeapError
pub type Result<T> = std::result::Result<T, HeapError>;

/// Unified error type for heapkv operations
#[derive(Debug, Error)]
pub enum HeapError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    NotFound,

    // -------------------------------------------------------------------------
    // Input Errors (detected before any mutation)
    // -------------------------------------------------------------------------
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Key size not in [1,{}]: {0}", MAX_KEY_SIZE)]
    InvalidKeySize(usize),

    #[error("Value size not in [0,{}]: {0}", MAX_VALUE_SIZE)]
    InvalidValueSize(usize),

    // -------------------------------------------------------------------------
    // Data Errors
    // -------------------------------------------------------------------------
    #[error("Data corruption at offset {offset}: {reason}")]
    DataCorruption { offset: u64, reason: String },
}

impl HeapError {
    /// Build a corruption error for the record starting at `offset`
    pub fn corruption(offset: u64, reason: impl Into<String>) -> Self {
        HeapError::DataCorruption {
            offset,
            reason: reason.into(),
        }
    }

    /// The discriminant of this error, without payload
    pub fn kind(&self) -> ErrorKind {
        match self {
            HeapError::Io(_) => ErrorKind::Io,
            HeapError::NotFound => ErrorKind::NotFound,
            HeapError::InvalidEncoding(_) => ErrorKind::InvalidEncoding,
            HeapError::InvalidKeySize(_) => ErrorKind::InvalidKeySize,
            HeapError::InvalidValueSize(_) => ErrorKind::InvalidValueSize,
            HeapError::DataCorruption { .. } => ErrorKind::DataCorruption,
        }
    }
}

/// Error kinds, one per [`HeapError`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorKind {
    NotFound = 1,
    Io = 10,
    InvalidEncoding = 30,
    InvalidKeySize = 31,
    InvalidValueSize = 32,
    DataCorruption = 50,
}

impl ErrorKind {
    /// Stable numeric code, as returned across the C ABI
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map a numeric code back to its kind
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ErrorKind::NotFound),
            10 => Some(ErrorKind::Io),
            30 => Some(ErrorKind::InvalidEncoding),
            31 => Some(ErrorKind::InvalidKeySize),
            32 => Some(ErrorKind::InvalidValueSize),
            50 => Some(ErrorKind::DataCorruption),
            _ => None,
        }
    }

    /// Short human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "key not found",
            ErrorKind::Io => "I/O error",
            ErrorKind::InvalidEncoding => "invalid encoding",
            ErrorKind::InvalidKeySize => "invalid key size",
            ErrorKind::InvalidValueSize => "invalid value size",
            ErrorKind::DataCorruption => "data corruption",
        }
    }
}
