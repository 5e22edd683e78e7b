//! Snapshot iteration.
//!
//! A [`SnapshotIterator`] owns a copy of its source's keys and values taken
//! when it is created. Later mutation of the source is invisible to it, and
//! any number of iterators over one source can be live at once.

use std::iter::FusedIterator;

use tracing::{trace, warn};

use crate::traits::SnapshotSource;

/// Iterator over an owned copy of a container's entries.
#[derive(Clone, Debug)]
pub struct SnapshotIterator<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
    cursor: usize,
}

impl<K, V> SnapshotIterator<K, V> {
    /// Capture the current keys and values of `source`.
    ///
    /// If the source reports views of different lengths, iteration stops at
    /// the end of the shorter one.
    pub fn new<S>(source: &S) -> Self
    where
        S: SnapshotSource<Key = K, Value = V>,
    {
        let keys = source.snapshot_keys();
        let values = source.snapshot_values();
        if keys.len() != values.len() {
            warn!(
                keys = keys.len(),
                values = values.len(),
                "snapshot source reported misaligned views"
            );
        }
        Self::from_parts(keys, values)
    }

    /// Build an iterator directly from two index-aligned sequences.
    pub fn from_parts(keys: Vec<K>, values: Vec<V>) -> Self {
        trace!(entries = keys.len().min(values.len()), "snapshot captured");
        Self {
            keys,
            values,
            cursor: 0,
        }
    }

    /// Total number of entries in the snapshot.
    pub fn len(&self) -> usize {
        self.keys.len().min(self.values.len())
    }

    /// Returns `true` if the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries not yet passed by the cursor, including the current one.
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.cursor)
    }

    /// Returns `true` while the cursor sits on an entry.
    pub fn has_next(&self) -> bool {
        self.cursor < self.len()
    }

    /// The entry at the cursor.
    pub fn current(&self) -> Option<(&K, &V)> {
        if self.has_next() {
            Some((&self.keys[self.cursor], &self.values[self.cursor]))
        } else {
            None
        }
    }

    /// The key at the cursor.
    pub fn key(&self) -> Option<&K> {
        self.current().map(|(key, _)| key)
    }

    /// The value at the cursor.
    pub fn value(&self) -> Option<&V> {
        self.current().map(|(_, value)| value)
    }

    /// Move the cursor one entry forward. A no-op once exhausted.
    pub fn advance(&mut self) {
        if self.has_next() {
            self.cursor += 1;
        }
    }
}

impl<K: Clone, V: Clone> Iterator for SnapshotIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self
            .current()
            .map(|(key, value)| (key.clone(), value.clone()));
        self.advance();
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<K: Clone, V: Clone> ExactSizeIterator for SnapshotIterator<K, V> {}

impl<K: Clone, V: Clone> FusedIterator for SnapshotIterator<K, V> {}
