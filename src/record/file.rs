//! Heap File
//!
//! Owns the backing file: appends new records and reads existing ones by
//! location.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{HeapError, Result};
use crate::index::KeyIndex;

use super::{HeapReplay, Record, RecordLocation, ReplayStats};

/// The append-only heap file
pub struct HeapFile {
    /// Path the file was opened from
    path: PathBuf,
    /// Opened for read + append; writes always land at the end
    file: File,
    /// Current file length, i.e. the offset of the next record
    len: u64,
    /// When to fsync
    sync_strategy: SyncStrategy,
    /// Writes flushed but not yet fsynced
    unsynced_writes: usize,
}

impl HeapFile {
    /// Open a heap file for reading and appending.
    ///
    /// With `create` set a missing file is created empty. The file is not
    /// replayed here; see [`HeapFile::replay`].
    pub fn open(path: &Path, create: bool, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(create)
            .open(path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
            sync_strategy,
            unsynced_writes: 0,
        })
    }

    /// Replay every record from the start of the file
    pub fn replay(&mut self) -> Result<(KeyIndex, ReplayStats)> {
        self.file.seek(SeekFrom::Start(0))?;
        let (index, stats) = HeapReplay::replay(&self.file)?;

        // Anything appended behind our back would break offset tracking
        self.len = stats.bytes_replayed;
        Ok((index, stats))
    }

    /// Append a record and make it durable per the sync strategy.
    ///
    /// On failure the file is truncated back to its previous length so no
    /// partial record is left at the tail.
    pub fn append(&mut self, record: &Record) -> Result<RecordLocation> {
        let bytes = record.encode();
        let offset = self.len;

        if let Err(e) = self.write_and_sync(&bytes) {
            self.rollback(offset);
            return Err(e);
        }

        self.len += bytes.len() as u64;
        Ok(RecordLocation::new(offset, bytes.len() as u32))
    }

    /// Read and verify the record at `location`
    pub fn read_at(&mut self, location: RecordLocation) -> Result<Record> {
        if location.end() > self.len {
            return Err(HeapError::corruption(
                location.offset,
                format!(
                    "record end {} is past end of file {}",
                    location.end(),
                    self.len
                ),
            ));
        }

        self.file.seek(SeekFrom::Start(location.offset))?;
        let mut buf = vec![0u8; location.len as usize];
        self.file.read_exact(&mut buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                HeapError::corruption(location.offset, "truncated record")
            } else {
                HeapError::Io(e)
            }
        })?;

        Record::decode(&buf, location.offset)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        self.unsynced_writes = 0;
        Ok(())
    }

    /// Current file length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sync_strategy(&self) -> SyncStrategy {
        self.sync_strategy
    }

    /// Record that the underlying file now lives at `path` (after a rename)
    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.path = path;
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn write_and_sync(&mut self, bytes: &[u8]) -> Result<()> {
        self.file.write_all(bytes)?;
        self.file.flush()?;
        self.unsynced_writes += 1;

        let due = match self.sync_strategy {
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNWrites { count } => self.unsynced_writes >= count.max(1),
        };
        if due {
            self.file.sync_data()?;
            self.unsynced_writes = 0;
        }
        Ok(())
    }

    fn rollback(&mut self, offset: u64) {
        match self.file.set_len(offset) {
            Ok(()) => {
                tracing::warn!("Rolled back failed append at offset {}", offset);
            }
            Err(e) => {
                // Keep offsets honest even if the tail is now garbage
                self.len = self.file.metadata().map(|m| m.len()).unwrap_or(self.len);
                tracing::warn!(
                    "Failed to roll back append at offset {}: {} (file length now {})",
                    offset,
                    e,
                    self.len
                );
            }
        }
    }
}
