//! Key normalization for the native-map emulating container.
//!
//! A candidate key is first classified into exactly one [`KeyClass`], in a
//! fixed priority order, and the class alone decides the normalized key:
//!
//! | class                | normalized key                                 |
//! |----------------------|------------------------------------------------|
//! | list / object        | rejected with `InvalidKeyType`                 |
//! | missing (null)       | append signal, or `""` when appends are off    |
//! | bool                 | `0` / `1`                                      |
//! | float                | truncated toward zero; non-finite or out of range is `0` |
//! | canonical int string | the integer (`"3"`, `"-4"`, `"0"`)             |
//! | anything else        | unchanged (`"+6"`, `"01"`, `"-0"`, `"0.2"`, ints) |

use std::fmt;

use anykey_types::{Value, ValueKind};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// A normalized key as held by the native map.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeKey {
    Int(i64),
    Str(String),
}

impl NativeKey {
    /// The key a missing key maps to when appends are disabled.
    pub fn empty() -> Self {
        Self::Str(String::new())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(_) => None,
        }
    }
}

impl fmt::Display for NativeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<NativeKey> for Value {
    fn from(key: NativeKey) -> Self {
        match key {
            NativeKey::Int(n) => Value::Int(n),
            NativeKey::Str(s) => Value::Str(s),
        }
    }
}

/// Outcome of normalizing a key for a write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mangled {
    /// Store under the next free integer index.
    Append,
    /// Store under this key.
    Key(NativeKey),
}

/// Classification of a candidate key, in priority order.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyClass {
    Composite(ValueKind),
    Missing,
    Bool(bool),
    Float(f64),
    IntString(i64),
    Literal(NativeKey),
}

/// Classify a candidate key.
pub fn classify(key: Option<&Value>) -> KeyClass {
    match key {
        None | Some(Value::Null) => KeyClass::Missing,
        Some(value @ (Value::List(_) | Value::Object(_))) => KeyClass::Composite(value.kind()),
        Some(Value::Bool(b)) => KeyClass::Bool(*b),
        Some(Value::Float(x)) => KeyClass::Float(*x),
        Some(Value::Str(s)) => match canonical_int(s) {
            Some(n) => KeyClass::IntString(n),
            None => KeyClass::Literal(NativeKey::Str(s.clone())),
        },
        Some(Value::Int(n)) => KeyClass::Literal(NativeKey::Int(*n)),
    }
}

/// Normalize a key for a write.
pub fn mangle(key: Option<&Value>, append_on_null: bool) -> StoreResult<Mangled> {
    let key = match classify(key) {
        KeyClass::Composite(kind) => return Err(StoreError::InvalidKeyType(kind)),
        KeyClass::Missing if append_on_null => return Ok(Mangled::Append),
        KeyClass::Missing => NativeKey::empty(),
        KeyClass::Bool(b) => NativeKey::Int(i64::from(b)),
        KeyClass::Float(x) => NativeKey::Int(truncate_float(x)),
        KeyClass::IntString(n) => NativeKey::Int(n),
        KeyClass::Literal(key) => key,
    };
    Ok(Mangled::Key(key))
}

/// Normalize a key for a read or removal.
///
/// A missing key addresses `""` regardless of the append policy, the way the
/// native map reads a null offset.
pub fn normalize(key: &Value) -> StoreResult<NativeKey> {
    match mangle(Some(key), false)? {
        Mangled::Key(key) => Ok(key),
        Mangled::Append => Ok(NativeKey::empty()),
    }
}

/// Truncate toward zero. NaN, infinities and values outside `i64` give 0.
fn truncate_float(x: f64) -> i64 {
    if x.is_finite() && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        x as i64
    } else {
        0
    }
}

/// Parse `s` if it is the canonical decimal text of an `i64`.
///
/// Canonical means `0`, or an optional `-` followed by a non-zero digit and
/// more digits. Text that would overflow stays a string.
fn canonical_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let canonical = match digits.as_bytes() {
        [b'0'] => digits.len() == s.len(),
        [first, rest @ ..] => {
            (b'1'..=b'9').contains(first) && rest.iter().all(u8::is_ascii_digit)
        }
        [] => false,
    };
    if canonical {
        s.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anykey_types::{Object, ObjectRef};
    use proptest::prelude::*;

    fn key_of(value: impl Into<Value>, append: bool) -> Mangled {
        mangle(Some(&value.into()), append).unwrap()
    }

    fn int(n: i64) -> Mangled {
        Mangled::Key(NativeKey::Int(n))
    }

    fn string(s: &str) -> Mangled {
        Mangled::Key(NativeKey::Str(s.to_string()))
    }

    // -----------------------------------------------------------------------
    // Priority order
    // -----------------------------------------------------------------------

    #[test]
    fn composite_keys_are_rejected() {
        let err = mangle(Some(&Value::from(vec![Value::Int(1)])), true).unwrap_err();
        assert!(matches!(err, StoreError::InvalidKeyType(ValueKind::List)));
        assert_eq!(err.to_string(), "the key type, list, is not valid");

        let obj = Value::from(ObjectRef::new(Object::new("Test")));
        assert!(matches!(
            mangle(Some(&obj), false),
            Err(StoreError::InvalidKeyType(ValueKind::Object))
        ));
    }

    #[test]
    fn missing_key_depends_on_policy() {
        assert_eq!(mangle(None, true).unwrap(), Mangled::Append);
        assert_eq!(mangle(Some(&Value::Null), true).unwrap(), Mangled::Append);
        assert_eq!(mangle(None, false).unwrap(), string(""));
        assert_eq!(normalize(&Value::Null).unwrap(), NativeKey::empty());
    }

    #[test]
    fn bools_and_floats_become_ints() {
        assert_eq!(key_of(false, true), int(0));
        assert_eq!(key_of(true, true), int(1));
        assert_eq!(key_of(2.3, true), int(2));
        assert_eq!(key_of(-2.9, true), int(-2));
        assert_eq!(key_of(f64::NAN, true), int(0));
        assert_eq!(key_of(f64::INFINITY, true), int(0));
        assert_eq!(key_of(1.0e30, true), int(0));
    }

    #[test]
    fn canonical_int_strings_become_ints() {
        assert_eq!(key_of("3", true), int(3));
        assert_eq!(key_of("-4", true), int(-4));
        assert_eq!(key_of("0", true), int(0));
        assert_eq!(key_of("9223372036854775807", true), int(i64::MAX));
        assert_eq!(key_of("-9223372036854775808", true), int(i64::MIN));
    }

    #[test]
    fn other_strings_pass_through() {
        for s in ["01", "-05", "+6", "0.2", "-0.2", "-0", "-", "", " 1", "1e3", "9223372036854775808"] {
            assert_eq!(key_of(s, true), string(s), "{s:?} should stay a string");
        }
    }

    #[test]
    fn ints_pass_through() {
        assert_eq!(key_of(-17, false), int(-17));
    }

    proptest! {
        #[test]
        fn int_text_collides_with_int(n in any::<i64>()) {
            prop_assert_eq!(key_of(n.to_string(), true), int(n));
        }

        #[test]
        fn plus_prefix_never_collides(n in 0i64..1_000_000) {
            let text = format!("+{n}");
            prop_assert_eq!(key_of(text.clone(), true), string(&text));
        }
    }
}
