use anykey_types::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{self, VariantTag};
use crate::error::{StoreError, StoreResult};
use crate::iter::SnapshotIterator;
use crate::options::StoreOptions;
use crate::traits::{KeyedStore, SnapshotSource};

/// Advance an append counter past an explicitly written integer key.
///
/// The counter never decreases and saturates at `i64::MAX`.
pub(crate) fn bump_next_index(next: i64, written: Option<i64>) -> i64 {
    match written {
        Some(n) if n >= next => n.saturating_add(1),
        _ => next,
    }
}

/// Key for the next append, given the current counter.
///
/// The counter saturates, so only its last value can already be taken.
pub(crate) fn append_key(next: i64, occupied: impl FnOnce(&Value) -> bool) -> StoreResult<Value> {
    let key = Value::Int(next);
    if next == i64::MAX && occupied(&key) {
        return Err(StoreError::NextIndexOccupied(next));
    }
    Ok(key)
}

/// Initial append counter for a set of existing keys.
pub(crate) fn initial_next_index<'a>(keys: impl IntoIterator<Item = &'a Value>) -> i64 {
    keys.into_iter()
        .fold(0, |next, key| bump_next_index(next, key.as_int()))
}

/// Associative container with strict key equality, stored as two parallel
/// sequences.
///
/// Any [`Value`] can be a key. Keys are matched with [`Value::strict_eq`]:
/// no coercion, lists compared element-wise, objects by identity. Entries
/// keep insertion order, and `values()[i]` always belongs to `keys()[i]`.
///
/// Writes without a key either append under a fresh `Value::Int` key taken
/// from a counter owned by the store, or, when appends are disabled, use
/// `Value::Null` as a literal key.
#[derive(Clone, Debug)]
pub struct StrictKeyStore<V> {
    keys: Vec<Value>,
    values: Vec<V>,
    options: StoreOptions,
    next_index: i64,
}

#[derive(Serialize)]
struct StrictStateRef<'a, V> {
    options: StoreOptions,
    next_index: i64,
    keys: &'a [Value],
    values: &'a [V],
}

#[derive(Deserialize)]
struct StrictState<V> {
    options: StoreOptions,
    next_index: i64,
    keys: Vec<Value>,
    values: Vec<V>,
}

impl<V> StrictKeyStore<V> {
    /// Create an empty store with default options.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Create an empty store with the given options.
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            options,
            next_index: 0,
        }
    }

    /// Create a store from index-aligned keys and values.
    ///
    /// Keys are taken as given; if a key appears twice, lookups see the
    /// first occurrence.
    pub fn from_parts(
        keys: Vec<Value>,
        values: Vec<V>,
        options: StoreOptions,
    ) -> StoreResult<Self> {
        if keys.len() != values.len() {
            return Err(StoreError::KeyValueCountMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }
        let next_index = initial_next_index(&keys);
        Ok(Self {
            keys,
            values,
            options,
            next_index,
        })
    }

    /// The options this store was created with.
    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> &[Value] {
        &self.keys
    }

    /// Values in insertion order, aligned with [`keys`](Self::keys).
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// The key the next append will use.
    pub fn next_index(&self) -> i64 {
        self.next_index
    }

    /// Index of the first key strictly equal to `key`.
    pub fn position(&self, key: &Value) -> Option<usize> {
        self.keys.iter().position(|k| k.strict_eq(key))
    }

    fn append(&mut self, value: V) -> StoreResult<Value> {
        let key = append_key(self.next_index, |k| self.position(k).is_some())?;
        self.keys.push(key.clone());
        self.values.push(value);
        self.next_index = self.next_index.saturating_add(1);
        debug!(key = %key, count = self.keys.len(), "appended entry");
        Ok(key)
    }

    /// Independent snapshot of the current entries.
    pub fn iter(&self) -> SnapshotIterator<Value, V>
    where
        V: Clone,
    {
        SnapshotIterator::from_parts(self.keys.clone(), self.values.clone())
    }

    /// Encode options, append counter, keys and values.
    pub fn serialize(&self) -> StoreResult<Vec<u8>>
    where
        V: Serialize,
    {
        codec::encode(
            VariantTag::Strict,
            &StrictStateRef {
                options: self.options,
                next_index: self.next_index,
                keys: &self.keys,
                values: &self.values,
            },
        )
    }

    /// Rebuild a store from [`serialize`](Self::serialize) output.
    ///
    /// Object keys and values come back as new instances with the same
    /// content.
    pub fn deserialize(data: &[u8]) -> StoreResult<Self>
    where
        V: DeserializeOwned,
    {
        let state: StrictState<V> = codec::decode(VariantTag::Strict, data)?;
        let mut store = Self::from_parts(state.keys, state.values, state.options)
            .map_err(|e| StoreError::Format(e.to_string()))?;
        if state.next_index < store.next_index {
            return Err(StoreError::Format(format!(
                "append counter {} is behind existing key {}",
                state.next_index,
                store.next_index - 1
            )));
        }
        store.next_index = state.next_index;
        Ok(store)
    }
}

impl<V> Default for StrictKeyStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyedStore<V> for StrictKeyStore<V> {
    fn exists(&self, key: &Value) -> StoreResult<bool> {
        Ok(self.position(key).is_some())
    }

    fn get(&self, key: &Value) -> StoreResult<&V> {
        self.position(key)
            .map(|i| &self.values[i])
            .ok_or_else(|| StoreError::KeyNotFound(key.clone()))
    }

    fn get_mut(&mut self, key: &Value) -> StoreResult<&mut V> {
        match self.position(key) {
            Some(i) => Ok(&mut self.values[i]),
            None => Err(StoreError::KeyNotFound(key.clone())),
        }
    }

    fn set(&mut self, key: Option<Value>, value: V) -> StoreResult<Value> {
        let key = key.unwrap_or(Value::Null);
        if key.is_null() && self.options.append_on_null {
            return self.append(value);
        }
        match self.position(&key) {
            Some(i) => {
                self.values[i] = value;
                debug!(key = %key, index = i, "replaced entry");
            }
            None => {
                self.next_index = bump_next_index(self.next_index, key.as_int());
                self.keys.push(key.clone());
                self.values.push(value);
                debug!(key = %key, count = self.keys.len(), "inserted entry");
            }
        }
        Ok(key)
    }

    fn unset(&mut self, key: &Value) -> StoreResult<bool> {
        let Some(i) = self.position(key) else {
            return Ok(false);
        };
        self.keys.remove(i);
        self.values.remove(i);
        debug!(key = %key, index = i, "removed entry");
        Ok(true)
    }

    fn count(&self) -> usize {
        self.values.len()
    }
}

impl<V: Clone> SnapshotSource for StrictKeyStore<V> {
    type Key = Value;
    type Value = V;

    fn snapshot_keys(&self) -> Vec<Value> {
        self.keys.clone()
    }

    fn snapshot_values(&self) -> Vec<V> {
        self.values.clone()
    }
}
