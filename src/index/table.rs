//! KeyIndex implementation
//!
//! BTreeMap-based index from key to record location.

use std::collections::BTreeMap;

use crate::record::RecordLocation;

use super::KeyIterator;

/// Maps every live key to the location of its most recent record
#[derive(Debug, Default, Clone)]
pub struct KeyIndex {
    entries: BTreeMap<String, RecordLocation>,
}

impl KeyIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `key` at `location`, returning the superseded location if any
    pub fn insert(&mut self, key: String, location: RecordLocation) -> Option<RecordLocation> {
        self.entries.insert(key, location)
    }

    /// Location of the latest record for `key`
    pub fn get(&self, key: &str) -> Option<RecordLocation> {
        self.entries.get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total encoded size of all live records
    pub fn live_bytes(&self) -> u64 {
        self.entries.values().map(|loc| loc.len as u64).sum()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, RecordLocation)> + '_ {
        self.entries.iter().map(|(k, loc)| (k.as_str(), *loc))
    }

    /// Copy the current key set into a detached iterator
    pub fn snapshot(&self) -> KeyIterator {
        KeyIterator::new(self.entries.keys().cloned().collect())
    }
}
