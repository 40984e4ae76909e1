//! Tests for RecordReader and HeapReplay
//!
//! These tests verify:
//! - Sequential scanning with correct offsets
//! - Clean stop at end of input
//! - Truncated tails are reported, not ignored
//! - Replay keeps the last record per key
//! - Verify mode (stats only)

use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::PathBuf;

use heapkv::index::KeyIndex;
use heapkv::record::{HeapReplay, Record, RecordLocation, RecordReader, ReplayStats};
use heapkv::{ErrorKind, HeapError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn encode_all(pairs: &[(&str, &str)]) -> Vec<u8> {
    let mut data = Vec::new();
    for (key, value) in pairs {
        data.extend_from_slice(&Record::new(*key, *value).encode());
    }
    data
}

fn setup_temp_heap() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.heap");
    (temp_dir, path)
}

// =============================================================================
// RecordReader Tests
// =============================================================================

#[test]
fn test_read_empty_input() {
    let mut reader = RecordReader::new(Cursor::new(Vec::new()));

    assert!(reader.next_record().unwrap().is_none());
    assert_eq!(reader.offset(), 0);
}

#[test]
fn test_read_sequential_offsets() {
    let data = encode_all(&[("a", "1"), ("bb", "22"), ("ccc", "")]);
    let reader = RecordReader::new(Cursor::new(data.clone()));

    let scanned: Vec<_> = reader.map(|r| r.unwrap()).collect();

    assert_eq!(scanned.len(), 3);
    assert_eq!(scanned[0].location, RecordLocation::new(0, 11));
    assert_eq!(scanned[1].location, RecordLocation::new(11, 13));
    assert_eq!(scanned[2].location, RecordLocation::new(24, 12));
    assert_eq!(scanned[2].location.end(), data.len() as u64);
    assert_eq!(scanned[1].record.key(), "bb");
    assert_eq!(scanned[1].record.value(), "22");
}

#[test]
fn test_read_truncated_tail_is_corruption() {
    let mut data = encode_all(&[("a", "1"), ("b", "2")]);
    data.truncate(data.len() - 2);

    let mut reader = RecordReader::new(Cursor::new(data));
    assert!(reader.next_record().unwrap().is_some());

    match reader.next_record() {
        Err(HeapError::DataCorruption { offset, .. }) => assert_eq!(offset, 11),
        other => panic!("expected DataCorruption, got {:?}", other),
    }
}

#[test]
fn test_read_lone_length_byte_is_corruption() {
    let mut reader = RecordReader::new(Cursor::new(vec![5u8]));

    let err = reader.next_record().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataCorruption);
}

#[test]
fn test_iterator_stops_after_error() {
    let mut data = encode_all(&[("a", "1")]);
    data[1] = b'z';
    data.extend_from_slice(&encode_all(&[("b", "2")]));

    let mut reader = RecordReader::new(Cursor::new(data));
    assert!(reader.next().unwrap().is_err());
    assert!(reader.next().is_none());
}

#[test]
fn test_read_oversized_value_length_is_corruption() {
    let mut data = vec![1u8, b'k'];
    data.extend_from_slice(&u32::MAX.to_le_bytes());

    let mut reader = RecordReader::new(Cursor::new(data));
    let err = reader.next_record().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataCorruption);
}

// =============================================================================
// Replay Tests
// =============================================================================

#[test]
fn test_replay_last_record_wins() {
    let data = encode_all(&[("k", "v1"), ("other", "x"), ("k", "v2")]);

    let (index, stats): (KeyIndex, ReplayStats) = HeapReplay::replay(Cursor::new(data)).unwrap();

    assert_eq!(index.len(), 2);
    let location = index.get("k").unwrap();
    assert_eq!(location.offset, 12 + 15);
    assert_eq!(stats.records_replayed, 3);
    assert_eq!(stats.live_keys, 2);
    assert_eq!(stats.superseded_records, 1);
}

#[test]
fn test_replay_empty() {
    let (index, stats) = HeapReplay::replay(Cursor::new(Vec::new())).unwrap();

    assert!(index.is_empty());
    assert_eq!(stats, ReplayStats::default());
}

#[test]
fn test_replay_aborts_on_corruption() {
    let mut data = encode_all(&[("a", "1"), ("b", "2"), ("c", "3")]);
    data[12] ^= 0x01;

    let err = HeapReplay::replay(Cursor::new(data)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataCorruption);
}

#[test]
fn test_verify_file() {
    let (_temp, path) = setup_temp_heap();
    let data = encode_all(&[("a", "1"), ("a", "2")]);
    fs::write(&path, &data).unwrap();

    let stats = HeapReplay::verify(&path).unwrap();

    assert_eq!(stats.records_replayed, 2);
    assert_eq!(stats.live_keys, 1);
    assert_eq!(stats.bytes_replayed, data.len() as u64);
}

#[test]
fn test_verify_missing_file_is_io_error() {
    let (_temp, path) = setup_temp_heap();

    let err = HeapReplay::verify(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_verify_truncated_file() {
    let (_temp, path) = setup_temp_heap();
    let data = encode_all(&[("a", "1")]);
    let mut file = File::create(&path).unwrap();
    file.write_all(&data[..data.len() - 1]).unwrap();
    file.sync_all().unwrap();

    let err = HeapReplay::verify(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataCorruption);
}
