//! Index Module
//!
//! In-memory mapping from each live key to its latest record.
//!
//! ## Responsibilities
//! - Point lookups of record locations
//! - Later records override earlier ones during replay
//! - Key snapshots for iteration
//!
//! ## Data Structure Choice
//! Using BTreeMap:
//! - Ordered keys give iterators a stable, deterministic order
//! - Simple and correct first, optimize later

mod iterator;
mod table;

pub use iterator::KeyIterator;
pub use table::KeyIndex;
