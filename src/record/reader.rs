//! Record Reader
//!
//! Sequential scanning of records from the start of a heap file.

use std::io::{self, BufReader, Read};

use crate::error::{HeapError, Result};

use super::{
    Record, RecordLocation, CHECKSUM_SIZE, KEY_LEN_SIZE, MAX_VALUE_SIZE, VALUE_LEN_SIZE,
};

/// A decoded record together with where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRecord {
    pub location: RecordLocation,
    pub record: Record,
}

/// Reads records one after another from any byte source
pub struct RecordReader<R: Read> {
    reader: BufReader<R>,
    /// Offset of the next record to read
    offset: u64,
    /// Set after the first error; the iterator then yields nothing
    failed: bool,
}

impl<R: Read> RecordReader<R> {
    /// Start reading at the current position of `inner`, which is taken
    /// to be offset 0 of the heap.
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            offset: 0,
            failed: false,
        }
    }

    /// Offset of the next record (equals bytes consumed so far)
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at a clean end of input. A record cut short by
    /// end of input is `DataCorruption`, never a silent stop.
    pub fn next_record(&mut self) -> Result<Option<ScannedRecord>> {
        let start = self.offset;

        let mut key_len = [0u8; KEY_LEN_SIZE];
        if read_full(&mut self.reader, &mut key_len)? == 0 {
            return Ok(None);
        }
        let key_len = key_len[0] as usize;

        // Key plus the value length prefix
        let mut buf = Vec::with_capacity(KEY_LEN_SIZE + key_len + VALUE_LEN_SIZE);
        buf.push(key_len as u8);
        self.read_into(&mut buf, key_len + VALUE_LEN_SIZE, start)?;

        let len_bytes: [u8; VALUE_LEN_SIZE] = buf[buf.len() - VALUE_LEN_SIZE..]
            .try_into()
            .map_err(|_| HeapError::corruption(start, "bad value length prefix"))?;
        let value_len = u32::from_le_bytes(len_bytes) as usize;
        if value_len > MAX_VALUE_SIZE {
            return Err(HeapError::corruption(
                start,
                format!("value length {} exceeds {}", value_len, MAX_VALUE_SIZE),
            ));
        }

        self.read_into(&mut buf, value_len + CHECKSUM_SIZE, start)?;

        let record = Record::decode(&buf, start)?;
        self.offset += buf.len() as u64;

        tracing::trace!("Scanned record at offset {} ({} bytes)", start, buf.len());

        Ok(Some(ScannedRecord {
            location: RecordLocation::new(start, buf.len() as u32),
            record,
        }))
    }

    /// Append exactly `n` bytes from the source onto `buf`
    fn read_into(&mut self, buf: &mut Vec<u8>, n: usize, start: u64) -> Result<()> {
        let old_len = buf.len();
        buf.resize(old_len + n, 0);
        let got = read_full(&mut self.reader, &mut buf[old_len..])?;
        if got < n {
            return Err(HeapError::corruption(
                start,
                format!(
                    "truncated record: expected {} more bytes, found {}",
                    n, got
                ),
            ));
        }
        Ok(())
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<ScannedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Like `read_exact`, but reports how many bytes were available instead of
/// failing at end of input.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
