//! # heapkv
//!
//! A minimal persistent key-value heap with:
//! - A single append-only file per store
//! - CRC32-checked records, replayed on open to rebuild the index
//! - Point lookups with one targeted read
//! - Snapshot key iteration
//! - A C ABI for non-Rust callers
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              C ABI (heap_open / heap_get / ...)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Store                               │
//! │              (file Mutex → index RwLock)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  HeapFile   │          │  KeyIndex   │──▶ KeyIterator
//!   │  (Append)   │          │ (BTreeMap)  │    (snapshot)
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use heapkv::Store;
//!
//! let store = Store::open("users.db")?;
//! store.set("user:1", "alice")?;
//! assert_eq!(store.get("user:1")?, "alice");
//! for key in store.iter_keys() {
//!     println!("{}", key);
//! }
//! store.close()?;
//! # Ok::<(), heapkv::HeapError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod validate;

pub mod record;
pub mod index;
pub mod store;
pub mod ffi;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, HeapError, Result};
pub use config::{StoreConfig, SyncStrategy};
pub use index::KeyIterator;
pub use record::{MAX_KEY_SIZE, MAX_VALUE_SIZE};
pub use store::{CompactionStats, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of heapkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
