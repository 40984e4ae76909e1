//! Store Module
//!
//! The storage engine: one append-only heap file plus an in-memory index.
//!
//! ## Responsibilities
//! - Replay the heap file on open to rebuild the index
//! - Serve point lookups with a single targeted read
//! - Append new records for every write
//! - Hand out key snapshots for iteration
//! - Optional compaction of superseded records

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::config::StoreConfig;
use crate::error::{HeapError, Result};
use crate::index::{KeyIndex, KeyIterator};
use crate::record::{HeapFile, Record, RecordLocation, ReplayStats};
use crate::validate::{validate_key, validate_value};

/// A file-backed key-value store
///
/// ## Concurrency Model
///
/// - **Heap file** (`file`): exclusive `Mutex`. Every read seeks, and every
///   write appends, so all file access is serialized.
/// - **Index** (`index`): `RwLock`. Writers take it only after the record
///   is durable, so it never points at a missing or partial record.
/// - Lock order is always `file` → `index`.
///
/// `Store` is `Send + Sync` and may be shared through an `Arc`.
pub struct Store {
    /// Store configuration
    config: StoreConfig,

    /// Backing heap file
    file: Mutex<HeapFile>,

    /// Key → latest record location
    index: RwLock<KeyIndex>,

    /// What the open-time replay found
    replay_stats: ReplayStats,
}

/// Result of a compaction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionStats {
    /// Records written to the compacted file
    pub live_records: u64,

    /// File size before compaction
    pub bytes_before: u64,

    /// File size after compaction
    pub bytes_after: u64,
}

impl CompactionStats {
    pub fn bytes_reclaimed(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}

impl Store {
    /// Open or create a store at `path` with default settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let config = StoreConfig::builder().path(path.as_ref()).build();
        Self::with_config(config)
    }

    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Open (or create) the heap file
    /// 2. Replay every record, verifying checksums
    /// 3. Ready to serve requests
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        let mut file = HeapFile::open(&config.path, config.create_if_missing, config.sync_strategy)?;
        let (index, replay_stats) = file.replay()?;

        tracing::info!(
            "Opened heap {}: {} records replayed, {} live keys, {} superseded, {} bytes",
            config.path.display(),
            replay_stats.records_replayed,
            replay_stats.live_keys,
            replay_stats.superseded_records,
            replay_stats.bytes_replayed
        );

        Ok(Self {
            config,
            file: Mutex::new(file),
            index: RwLock::new(index),
            replay_stats,
        })
    }

    /// Get the value of `key`
    ///
    /// Returns `NotFound` if the key was never set. The record is re-read
    /// and its checksum re-verified on every call.
    pub fn get(&self, key: &str) -> Result<String> {
        validate_key(key)?;

        let mut file = self.file.lock();
        let location = self.index.read().get(key).ok_or(HeapError::NotFound)?;

        let record = file.read_at(location)?;
        if record.key() != key {
            return Err(HeapError::corruption(
                location.offset,
                format!("expected record for key {:?}, found {:?}", key, record.key()),
            ));
        }

        tracing::trace!("get {:?} -> offset {}", key, location.offset);
        Ok(record.into_value())
    }

    /// Set `key` to `value`
    ///
    /// Steps:
    /// 1. Validate key and value (no write on failure)
    /// 2. Append the record and sync
    /// 3. Point the index at the new record
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        validate_value(value)?;

        let record = Record::new(key, value);

        let mut file = self.file.lock();
        let location = file.append(&record)?;
        self.index.write().insert(key.to_owned(), location);

        tracing::trace!(
            "set {:?} ({} bytes) at offset {}",
            key,
            value.len(),
            location.offset
        );
        Ok(())
    }

    /// Snapshot the current key set
    ///
    /// The iterator does not see writes made after this call and does not
    /// borrow the store.
    pub fn iter_keys(&self) -> KeyIterator {
        self.index.read().snapshot()
    }

    /// Close the store, syncing outstanding writes
    pub fn close(self) -> Result<()> {
        let mut file = self.file.into_inner();
        file.sync()?;
        tracing::debug!("Closed heap {}", file.path().display());
        Ok(())
    }

    /// Rewrite the heap keeping only the latest record of each key
    ///
    /// Steps:
    /// 1. Hold the file lock (no writes while compacting)
    /// 2. Copy every live record into `<path>.compact` and fsync it
    /// 3. Atomically rename it over the heap file
    /// 4. Swap in the new file handle and index
    ///
    /// If anything fails before the rename, the heap file is untouched.
    pub fn compact(&self) -> Result<CompactionStats> {
        let mut file = self.file.lock();
        let bytes_before = file.len();
        let path = file.path().to_path_buf();
        let tmp_path = compaction_path(&path);

        let live: Vec<(String, RecordLocation)> = self
            .index
            .read()
            .iter()
            .map(|(key, location)| (key.to_owned(), location))
            .collect();
        let live_records = live.len() as u64;

        let new_index = match write_compacted(&mut file, live, &tmp_path) {
            Ok(index) => index,
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                return Err(e);
            }
        };

        let mut compacted = match HeapFile::open(&tmp_path, false, self.config.sync_strategy) {
            Ok(f) => f,
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                return Err(e);
            }
        };
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        compacted.set_path(path);

        let bytes_after = compacted.len();
        *file = compacted;
        *self.index.write() = new_index;

        let stats = CompactionStats {
            live_records,
            bytes_before,
            bytes_after,
        };
        tracing::info!(
            "Compacted heap {}: {} live records, {} -> {} bytes",
            file.path().display(),
            live_records,
            bytes_before,
            bytes_after
        );
        Ok(stats)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whether `key` currently has a value
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.read().contains_key(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Size of the heap file, superseded records included
    pub fn file_size(&self) -> u64 {
        self.file.lock().len()
    }

    /// Path of the heap file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Statistics from the replay performed by `open`
    pub fn replay_stats(&self) -> ReplayStats {
        self.replay_stats
    }

    /// Get the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

/// `<path>.compact`, next to the heap file
fn compaction_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".compact");
    PathBuf::from(name)
}

/// Copy the given live records into a fresh file, returning their new index
fn write_compacted(
    file: &mut HeapFile,
    live: Vec<(String, RecordLocation)>,
    tmp_path: &Path,
) -> Result<KeyIndex> {
    let out = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(tmp_path)?;
    let mut writer = BufWriter::new(out);

    let mut index = KeyIndex::new();
    let mut offset = 0u64;
    for (key, location) in live {
        let bytes = file.read_at(location)?.encode();
        writer.write_all(&bytes)?;
        index.insert(key, RecordLocation::new(offset, bytes.len() as u32));
        offset += bytes.len() as u64;
    }

    let out = writer.into_inner().map_err(|e| e.into_error())?;
    out.sync_all()?;
    Ok(index)
}
