//! Key Iterator
//!
//! One-shot iteration over a snapshot of the store's keys.

use std::vec;

/// Iterator over the keys that were live when it was created.
///
/// Holds its own copy of the keys, so later writes to the store are not
/// observed and the store may be dropped while iteration is in progress.
/// Keys come out in lexicographic byte order. Once exhausted it keeps
/// returning `None`.
#[derive(Debug)]
pub struct KeyIterator {
    remaining: vec::IntoIter<String>,
}

impl KeyIterator {
    pub(crate) fn new(keys: Vec<String>) -> Self {
        Self {
            remaining: keys.into_iter(),
        }
    }

    /// Number of keys not yet produced
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl Iterator for KeyIterator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.remaining.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.remaining.size_hint()
    }
}

impl ExactSizeIterator for KeyIterator {}

impl std::iter::FusedIterator for KeyIterator {}
