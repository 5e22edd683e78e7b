use anykey_types::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{self, VariantTag};
use crate::error::{StoreError, StoreResult};
use crate::iter::SnapshotIterator;
use crate::options::StoreOptions;
use crate::strict::{append_key, bump_next_index, initial_next_index};
use crate::traits::{KeyedStore, SnapshotSource};

/// A single key/value pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry<V> {
    pub key: Value,
    pub value: V,
}

impl<V> Entry<V> {
    /// Pair `value` with `key`.
    pub fn new(key: impl Into<Value>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Strict-key container backed by a single sequence of [`Entry`] records.
///
/// Behaves exactly like [`StrictKeyStore`](crate::StrictKeyStore); only the
/// storage shape differs. Useful when callers want to hand over or receive
/// whole entries rather than two parallel sequences.
#[derive(Clone, Debug)]
pub struct AnyKeyStore<V> {
    entries: Vec<Entry<V>>,
    options: StoreOptions,
    next_index: i64,
}

#[derive(Serialize)]
struct AnyKeyStateRef<'a, V> {
    options: StoreOptions,
    next_index: i64,
    entries: &'a [Entry<V>],
}

#[derive(Deserialize)]
struct AnyKeyState<V> {
    options: StoreOptions,
    next_index: i64,
    entries: Vec<Entry<V>>,
}

impl<V> AnyKeyStore<V> {
    /// Create an empty store with default options.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Create an empty store with the given options.
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            entries: Vec::new(),
            options,
            next_index: 0,
        }
    }

    /// Create a store holding `entries` as given, in order.
    pub fn from_entries(
        entries: impl IntoIterator<Item = Entry<V>>,
        options: StoreOptions,
    ) -> Self {
        let entries: Vec<Entry<V>> = entries.into_iter().collect();
        let next_index = initial_next_index(entries.iter().map(|e| &e.key));
        Self {
            entries,
            options,
            next_index,
        }
    }

    /// Options this store was created with.
    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[Entry<V>] {
        &self.entries
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> + '_ {
        self.entries.iter().map(|e| &e.key)
    }

    /// Values in insertion order, aligned with [`keys`](Self::keys).
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|e| &e.value)
    }

    /// The integer key the next append will use.
    pub fn next_index(&self) -> i64 {
        self.next_index
    }

    fn position(&self, key: &Value) -> Option<usize> {
        self.entries.iter().position(|e| e.key.strict_eq(key))
    }

    /// Independent snapshot of the current entries.
    pub fn iter(&self) -> SnapshotIterator<Value, V>
    where
        V: Clone,
    {
        SnapshotIterator::new(self)
    }

    /// Consume the store, yielding its entries.
    pub fn into_entries(self) -> Vec<Entry<V>> {
        self.entries
    }

    /// Encode options, append counter and entries.
    pub fn serialize(&self) -> StoreResult<Vec<u8>>
    where
        V: Serialize,
    {
        codec::encode(
            VariantTag::AnyKey,
            &AnyKeyStateRef {
                options: self.options,
                next_index: self.next_index,
                entries: &self.entries,
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
        let state: AnyKeyState<V> = codec::decode(VariantTag::AnyKey, data)?;
        let mut store = Self::from_entries(state.entries, state.options);
        if state.next_index < store.next_index {
            return Err(StoreError::Format(format!(
                "append counter {} is behind existing keys",
                state.next_index
            )));
        }
        store.next_index = state.next_index;
        Ok(store)
    }
}

impl<V> Default for AnyKeyStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyedStore<V> for AnyKeyStore<V> {
    fn exists(&self, key: &Value) -> StoreResult<bool> {
        Ok(self.position(key).is_some())
    }

    fn get(&self, key: &Value) -> StoreResult<&V> {
        self.entries
            .iter()
            .find(|e| e.key.strict_eq(key))
            .map(|e| &e.value)
            .ok_or_else(|| StoreError::KeyNotFound(key.clone()))
    }

    fn get_mut(&mut self, key: &Value) -> StoreResult<&mut V> {
        self.entries
            .iter_mut()
            .find(|e| e.key.strict_eq(key))
            .map(|e| &mut e.value)
            .ok_or_else(|| StoreError::KeyNotFound(key.clone()))
    }

    fn set(&mut self, key: Option<Value>, value: V) -> StoreResult<Value> {
        let key = key.unwrap_or(Value::Null);
        if key.is_null() && self.options.append_on_null {
            let key = append_key(self.next_index, |k| self.position(k).is_some())?;
            self.entries.push(Entry::new(key.clone(), value));
            self.next_index = self.next_index.saturating_add(1);
            debug!(key = %key, count = self.entries.len(), "appended entry");
            return Ok(key);
        }
        if let Some(i) = self.position(&key) {
            self.entries[i].value = value;
            debug!(key = %key, index = i, "replaced entry");
        } else {
            self.next_index = bump_next_index(self.next_index, key.as_int());
            self.entries.push(Entry::new(key.clone(), value));
            debug!(key = %key, count = self.entries.len(), "inserted entry");
        }
        Ok(key)
    }

    fn unset(&mut self, key: &Value) -> StoreResult<bool> {
        match self.position(key) {
            Some(i) => {
                self.entries.remove(i);
                debug!(key = %key, index = i, "removed entry");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn count(&self) -> usize {
        self.entries.len()
    }
}

impl<V: Clone> SnapshotSource for AnyKeyStore<V> {
    type Key = Value;
    type Value = V;

    fn snapshot_keys(&self) -> Vec<Value> {
        self.keys().cloned().collect()
    }

    fn snapshot_values(&self) -> Vec<V> {
        self.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anykey_types::{Object, ObjectRef};

    #[test]
    fn object_and_string_keys() {
        let mut store = AnyKeyStore::new();
        let this = ObjectRef::new(Object::new("AnyKeyTest"));

        store.set(Some(this.clone().into()), "test").unwrap();
        store.set(Some("this".into()), "text").unwrap();
        assert!(store.exists(&this.clone().into()).unwrap());
        assert_eq!(*store.get(&"this".into()).unwrap(), "text");

        store.unset(&this.clone().into()).unwrap();
        assert!(!store.exists(&this.into()).unwrap());
        assert!(store.exists(&"this".into()).unwrap());
    }

    #[test]
    fn append_after_explicit_keys() {
        let entries = (0..10).map(|i| Entry::new(i, format!("v{i}")));
        let mut store = AnyKeyStore::from_entries(entries, StoreOptions::default());
        let key = store.set(None, "test".to_string()).unwrap();
        assert_eq!(key, Value::Int(10));
        assert_eq!(store.get(&Value::Int(10)).unwrap(), "test");

        store.unset(&Value::Int(10)).unwrap();
        assert!(!store.exists(&Value::Int(10)).unwrap());
        assert_eq!(store.count(), 10);
    }

    #[test]
    fn null_literal_without_append() {
        let mut store = AnyKeyStore::with_options(StoreOptions::default().with_append_on_null(false));
        store.set(None, "test").unwrap();
        store.set(None, "changed").unwrap();
        assert!(!store.exists(&Value::Int(0)).unwrap());
        assert_eq!(*store.get(&Value::Null).unwrap(), "changed");
        assert_eq!(store.count(), 1);
        store.unset(&Value::Null).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn count_tracks_appends() {
        let mut store = AnyKeyStore::new();
        assert_eq!(store.count(), 0);
        store.set(None, 1).unwrap();
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn get_mut_and_missing() {
        let mut store = AnyKeyStore::new();
        store.set(Some(Value::Float(2.3)), vec![1]).unwrap();
        store.get_mut(&Value::Float(2.3)).unwrap().push(2);
        assert_eq!(store.get(&Value::Float(2.3)).unwrap(), &vec![1, 2]);
        assert!(matches!(
            store.get(&Value::Int(2)),
            Err(StoreError::KeyNotFound(Value::Int(2)))
        ));
    }

    #[test]
    fn snapshot_yields_original_entries() {
        let mut store = AnyKeyStore::new();
        for v in ["a", "b", "c"] {
            store.set(None, v).unwrap();
        }
        let it = store.iter();
        store.unset(&Value::Int(0)).unwrap();
        store.set(None, "d").unwrap();
        let seen: Vec<_> = it.map(|(_, v)| v).collect();
        assert_eq!(seen, vec!["a", "b", "c"]);
        assert_eq!(store.values().copied().collect::<Vec<_>>(), vec!["b", "c", "d"]);
    }

    #[test]
    fn roundtrip_restores_object_content() {
        let when = ObjectRef::new(Object::new("DateTime").with_field("iso", "2018-01-22 06:43:22"));
        let entries = (0..10).map(|i| Entry::new(i, "filler".to_string()));
        let mut store = AnyKeyStore::from_entries(entries, StoreOptions::default());
        store.set(Some(when.clone().into()), "test".to_string()).unwrap();

        let restored = AnyKeyStore::<String>::deserialize(&store.serialize().unwrap()).unwrap();
        let keys: Vec<&Value> = restored.keys().collect();
        let Value::Object(copy) = keys[10] else {
            panic!("expected an object key");
        };
        assert!(!copy.ptr_eq(&when));
        assert_eq!(
            copy.object().field("iso"),
            Some(&Value::from("2018-01-22 06:43:22"))
        );
        assert_eq!(restored.entries()[10].value, "test");
        assert_eq!(restored.options(), store.options());
        assert_eq!(restored.next_index(), store.next_index());
    }

    #[test]
    fn saturated_counter_reports_occupied() {
        let mut store = AnyKeyStore::new();
        store.set(Some(Value::Int(i64::MAX)), "max").unwrap();
        assert_eq!(store.next_index(), i64::MAX);

        let err = store.set(None, "next").unwrap_err();
        assert!(matches!(err, StoreError::NextIndexOccupied(i64::MAX)));
        assert_eq!(store.count(), 1);
        assert_eq!(*store.get(&Value::Int(i64::MAX)).unwrap(), "max");
    }

    #[test]
    fn into_entries_hands_back_insertion_order() {
        let mut store = AnyKeyStore::new();
        store.set(Some("k".into()), 1).unwrap();
        store.set(None, 2).unwrap();
        store.set(Some("k".into()), 3).unwrap();
        assert_eq!(
            store.into_entries(),
            vec![Entry::new("k", 3), Entry::new(0, 2)]
        );
    }

    #[test]
    fn counter_behind_keys_is_a_format_error() {
        let bytes = codec::encode(
            VariantTag::AnyKey,
            &AnyKeyStateRef {
                options: StoreOptions::default(),
                next_index: 0,
                entries: &[Entry::new(5, 1u8)],
            },
        )
        .unwrap();
        let err = AnyKeyStore::<u8>::deserialize(&bytes).unwrap_err();
        assert!(matches!(err, StoreError::Format(_)), "got {err:?}");
    }

    #[test]
    fn strict_payload_is_not_an_any_key_payload() {
        let mut strict = crate::StrictKeyStore::new();
        strict.set(None, 1u8).unwrap();
        let err = AnyKeyStore::<u8>::deserialize(&strict.serialize().unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::Format(_)));
    }
}
