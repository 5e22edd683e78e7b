use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Construction-time options shared by every container variant.
///
/// Options are fixed for the lifetime of a container and travel with it
/// through a serialize/deserialize round trip.
///
/// ```
/// use anykey_store::StoreOptions;
///
/// let opts = StoreOptions::from_toml_str("append_on_null = false").unwrap();
/// assert!(!opts.append_on_null);
/// assert!(StoreOptions::default().append_on_null);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// When `true`, a write without a key appends a new entry under a fresh
    /// integer key. When `false`, the missing key is a literal key of its own.
    pub append_on_null: bool,
}

impl StoreOptions {
    /// Set the append-on-null policy, builder style.
    pub fn with_append_on_null(mut self, append_on_null: bool) -> Self {
        self.append_on_null = append_on_null;
        self
    }

    /// Parse options from a TOML fragment. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|e| StoreError::Options(e.to_string()))
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            append_on_null: true,
        }
    }
}
