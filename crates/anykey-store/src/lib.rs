//! Associative containers keyed by arbitrary values.
//!
//! Three container variants share one contract, the [`KeyedStore`] trait:
//!
//! - [`StrictKeyStore`] -- two parallel sequences; any [`Value`] can be a key
//!   and keys match only under strict equality (no coercion, objects by
//!   identity)
//! - [`AnyKeyStore`] -- the same semantics over a single sequence of
//!   [`Entry`] records
//! - [`NativeEmulatingStore`] -- an insertion-ordered map whose keys are
//!   normalized by [`mangle`] exactly the way the host platform's native map
//!   coerces them
//!
//! Any of them, or any foreign type implementing [`SnapshotSource`], can
//! produce a [`SnapshotIterator`]: an owned copy of the entries taken at
//! creation time, unaffected by later mutation of the source.
//!
//! # Design Rules
//!
//! 1. Keys and values stay index-aligned; removal drops both at once.
//! 2. Setting an existing key replaces its value without moving it.
//! 3. A write without a key appends under a counter-derived integer key, or
//!    uses the null key literally when `append_on_null` is off.
//! 4. Failed operations leave the container unchanged.
//! 5. Containers are single-owner values; wrap them in a lock for shared use.
//!
//! ```
//! use anykey_store::{KeyedStore, StrictKeyStore};
//! use anykey_types::Value;
//!
//! let mut store = StrictKeyStore::new();
//! let first = store.set(None, "a")?;
//! let second = store.set(None, "b")?;
//! assert_eq!(store.count(), 2);
//! assert_eq!(*store.get(&first)?, "a");
//! assert_eq!(*store.get(&second)?, "b");
//!
//! // No coercion: the string "0" is not the integer key 0.
//! assert!(!store.exists(&Value::from("0"))?);
//! # Ok::<(), anykey_store::StoreError>(())
//! ```

pub mod any_key;
pub mod codec;
pub mod error;
pub mod iter;
pub mod mangle;
pub mod native;
pub mod options;
pub mod strict;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use any_key::{AnyKeyStore, Entry};
pub use error::{StoreError, StoreResult};
pub use iter::SnapshotIterator;
pub use mangle::{mangle, normalize, KeyClass, Mangled, NativeKey};
pub use native::NativeEmulatingStore;
pub use options::StoreOptions;
pub use strict::StrictKeyStore;
pub use traits::{KeyedStore, SnapshotSource};

pub use anykey_types::{Object, ObjectRef, Value, ValueKind};
