//! Heap Replay
//!
//! Rebuilds the key index by replaying every record in append order.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;
use crate::index::KeyIndex;

use super::RecordReader;

/// Replays heap files
pub struct HeapReplay;

/// Result of a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Number of records read and verified
    pub records_replayed: u64,

    /// Number of distinct keys after replay
    pub live_keys: u64,

    /// Records shadowed by a later record for the same key
    pub superseded_records: u64,

    /// Bytes consumed; equals the file length on success
    pub bytes_replayed: u64,
}

impl HeapReplay {
    /// Replay all records from `source`.
    ///
    /// This will:
    /// 1. Read records sequentially from offset 0
    /// 2. Verify each record's checksum
    /// 3. Point each key at its last occurrence
    ///
    /// Any corrupt or truncated record aborts the replay; a partially
    /// replayed index is never returned.
    pub fn replay<R: Read>(source: R) -> Result<(KeyIndex, ReplayStats)> {
        let mut reader = RecordReader::new(source);
        let mut index = KeyIndex::new();
        let mut stats = ReplayStats::default();

        while let Some(scanned) = reader.next_record()? {
            let (key, _) = scanned.record.into_parts();
            if index.insert(key, scanned.location).is_some() {
                stats.superseded_records += 1;
            }
            stats.records_replayed += 1;
        }

        stats.live_keys = index.len() as u64;
        stats.bytes_replayed = reader.offset();

        Ok((index, stats))
    }

    /// Verify integrity of a heap file without opening a store
    pub fn verify(path: &Path) -> Result<ReplayStats> {
        let file = File::open(path)?;
        let (_, stats) = Self::replay(file)?;
        Ok(stats)
    }
}
