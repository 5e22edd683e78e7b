use anykey_types::Value;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{self, VariantTag};
use crate::error::{StoreError, StoreResult};
use crate::iter::SnapshotIterator;
use crate::mangle::{mangle, normalize, Mangled, NativeKey};
use crate::options::StoreOptions;
use crate::strict::bump_next_index;
use crate::traits::{KeyedStore, SnapshotSource};

/// Container that reproduces the host platform's native map, quirks included.
///
/// Every key argument goes through [`mangle`] first, so `true` and `1`,
/// `"3"` and `3`, or `2.7` and `2` address the same entry, while `"+3"`
/// stays a separate string key. Lists and objects cannot be keys here.
///
/// Appends take the next free integer index: one past the largest integer
/// key ever written. Removing entries never lowers it.
#[derive(Clone, Debug)]
pub struct NativeEmulatingStore<V> {
    map: IndexMap<NativeKey, V>,
    options: StoreOptions,
    next_index: i64,
}

#[derive(Serialize)]
struct NativeStateRef<'a, V> {
    options: StoreOptions,
    next_index: i64,
    map: &'a IndexMap<NativeKey, V>,
}

#[derive(Deserialize)]
struct NativeState<V> {
    options: StoreOptions,
    next_index: i64,
    map: IndexMap<NativeKey, V>,
}

impl<V> NativeEmulatingStore<V> {
    /// Create an empty store with default options.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Create an empty store with the given options.
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            map: IndexMap::new(),
            options,
            next_index: 0,
        }
    }

    /// Build a store by writing each pair in order.
    ///
    /// Keys are normalized on the way in, so pairs whose keys collide after
    /// normalization overwrite each other.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (Value, V)>,
        options: StoreOptions,
    ) -> StoreResult<Self> {
        let mut store = Self::with_options(options);
        for (key, value) in pairs {
            store.set(Some(key), value)?;
        }
        Ok(store)
    }

    /// Options this store was created with.
    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Normalized keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &NativeKey> + '_ {
        self.map.keys()
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.map.values()
    }

    /// Borrow the backing map.
    pub fn as_map(&self) -> &IndexMap<NativeKey, V> {
        &self.map
    }

    /// The index the next append will use.
    pub fn next_index(&self) -> i64 {
        self.next_index
    }

    /// Independent snapshot of the current entries.
    pub fn iter(&self) -> SnapshotIterator<NativeKey, V>
    where
        V: Clone,
    {
        SnapshotIterator::new(self)
    }

    /// Encode options, append counter and the ordered map.
    pub fn serialize(&self) -> StoreResult<Vec<u8>>
    where
        V: Serialize,
    {
        codec::encode(
            VariantTag::Native,
            &NativeStateRef {
                options: self.options,
                next_index: self.next_index,
                map: &self.map,
            },
        )
    }

    /// Rebuild a store from [`serialize`](Self::serialize) output.
    ///
    /// Fails with `Format` when the stored counter is behind an existing
    /// integer key.
    pub fn deserialize(data: &[u8]) -> StoreResult<Self>
    where
        V: DeserializeOwned,
    {
        let state: NativeState<V> = codec::decode(VariantTag::Native, data)?;
        let floor = state
            .map
            .keys()
            .fold(0, |next, key| bump_next_index(next, key.as_int()));
        if state.next_index < floor {
            return Err(StoreError::Format(format!(
                "append counter {} is behind existing keys",
                state.next_index
            )));
        }
        Ok(Self {
            map: state.map,
            options: state.options,
            next_index: state.next_index,
        })
    }
}

impl<V> Default for NativeEmulatingStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyedStore<V> for NativeEmulatingStore<V> {
    fn exists(&self, key: &Value) -> StoreResult<bool> {
        Ok(self.map.contains_key(&normalize(key)?))
    }

    fn get(&self, key: &Value) -> StoreResult<&V> {
        let key = normalize(key)?;
        match self.map.get(&key) {
            Some(value) => Ok(value),
            None => Err(StoreError::KeyNotFound(key.into())),
        }
    }

    fn get_mut(&mut self, key: &Value) -> StoreResult<&mut V> {
        let key = normalize(key)?;
        match self.map.get_mut(&key) {
            Some(value) => Ok(value),
            None => Err(StoreError::KeyNotFound(key.into())),
        }
    }

    fn set(&mut self, key: Option<Value>, value: V) -> StoreResult<Value> {
        let key = match mangle(key.as_ref(), self.options.append_on_null)? {
            Mangled::Append => {
                let key = NativeKey::Int(self.next_index);
                if self.map.contains_key(&key) {
                    return Err(StoreError::NextIndexOccupied(self.next_index));
                }
                debug!(key = %key, count = self.map.len() + 1, "appended entry");
                key
            }
            Mangled::Key(key) => {
                debug!(key = %key, replaced = self.map.contains_key(&key), "wrote entry");
                key
            }
        };
        self.next_index = bump_next_index(self.next_index, key.as_int());
        self.map.insert(key.clone(), value);
        Ok(key.into())
    }

    fn unset(&mut self, key: &Value) -> StoreResult<bool> {
        let key = normalize(key)?;
        let removed = self.map.shift_remove(&key).is_some();
        if removed {
            debug!(key = %key, "removed entry");
        }
        Ok(removed)
    }

    fn count(&self) -> usize {
        self.map.len()
    }
}

impl<V: Clone> SnapshotSource for NativeEmulatingStore<V> {
    type Key = NativeKey;
    type Value = V;

    fn snapshot_keys(&self) -> Vec<NativeKey> {
        self.map.keys().cloned().collect()
    }

    fn snapshot_values(&self) -> Vec<V> {
        self.map.values().cloned().collect()
    }
}
