use anykey_types::Value;

use crate::error::StoreResult;
use crate::iter::SnapshotIterator;

/// Key-based access shared by every container variant.
///
/// All implementations must satisfy these invariants:
/// - `None` and `Some(Value::Null)` are the same "no key" input to `set`.
/// - Setting an existing key replaces its value in place; order and count
///   are unchanged.
/// - A failed call leaves the container unchanged.
/// - Entries keep insertion order.
pub trait KeyedStore<V> {
    /// Check whether a key is present.
    ///
    /// Returns `Err` only when the key cannot be used with this variant.
    fn exists(&self, key: &Value) -> StoreResult<bool>;

    /// Borrow the value stored under `key`.
    ///
    /// Returns `Err(StoreError::KeyNotFound)` if no stored key matches.
    fn get(&self, key: &Value) -> StoreResult<&V>;

    /// Mutably borrow the value stored under `key`.
    fn get_mut(&mut self, key: &Value) -> StoreResult<&mut V>;

    /// Store `value` under `key`, or under a fresh key when no key is given
    /// and the container appends on null.
    ///
    /// Returns the key the value ended up stored under.
    fn set(&mut self, key: Option<Value>, value: V) -> StoreResult<Value>;

    /// Remove the entry stored under `key`. Returns `true` if one existed.
    fn unset(&mut self, key: &Value) -> StoreResult<bool>;

    /// Number of entries.
    fn count(&self) -> usize;

    /// Returns `true` if the container holds no entries.
    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Anything that can expose its keys and values as two index-aligned views.
///
/// `snapshot_values()[i]` must be the value for `snapshot_keys()[i]`. Types
/// outside this crate implement it to be traversed by [`SnapshotIterator`].
pub trait SnapshotSource {
    type Key;
    type Value;

    /// Copy of the current keys, in iteration order.
    fn snapshot_keys(&self) -> Vec<Self::Key>;

    /// Copy of the current values, aligned with [`snapshot_keys`](Self::snapshot_keys).
    fn snapshot_values(&self) -> Vec<Self::Value>;

    /// Capture both views into a new independent iterator.
    fn snapshot(&self) -> SnapshotIterator<Self::Key, Self::Value>
    where
        Self: Sized,
    {
        SnapshotIterator::new(self)
    }
}
