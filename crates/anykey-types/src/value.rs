use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The kind of a [`Value`], used for classification and error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Object,
}

impl ValueKind {
    /// Human-readable type name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "string",
            Self::List => "list",
            Self::Object => "object",
        }
    }

    /// Returns `true` for kinds with no scalar representation.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::List | Self::Object)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The content of an opaque reference value.
///
/// Fields are kept in declaration order. Two objects with identical content
/// are still distinct keys unless they are the same [`ObjectRef`] instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Object {
    /// Class or type label of the object.
    pub class: String,
    /// Ordered `(name, value)` pairs.
    pub fields: Vec<(String, Value)>,
}

impl Object {
    /// Create an object with no fields.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

/// A shared handle to an [`Object`], compared by identity.
///
/// Cloning the handle shares the instance. Serializing writes the object's
/// content; deserializing always produces a fresh instance, so identity does
/// not survive a round trip.
#[derive(Clone)]
pub struct ObjectRef(Arc<Object>);

impl ObjectRef {
    /// Wrap an object in a new instance.
    pub fn new(object: Object) -> Self {
        Self(Arc::new(object))
    }

    /// Returns `true` if both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The class label of the referenced object.
    pub fn class(&self) -> &str {
        &self.0.class
    }

    /// Borrow the referenced object.
    pub fn object(&self) -> &Object {
        &self.0
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({}@{:p})", self.0.class, Arc::as_ptr(&self.0))
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Serialize for ObjectRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Object::deserialize(deserializer).map(Self::new)
    }
}

impl From<Object> for ObjectRef {
    fn from(object: Object) -> Self {
        Self::new(object)
    }
}

/// A key or value of any supported kind.
///
/// Equality is strict: kinds must match and no coercion happens, so
/// `Int(1)`, `Float(1.0)`, `Bool(true)` and `Str("1")` are four different
/// keys. Lists compare element-wise, objects by identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Object(ObjectRef),
}

impl Value {
    /// Classify this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Str(_) => ValueKind::Str,
            Self::List(_) => ValueKind::List,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Returns `true` if this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The integer payload, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The string payload, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Same kind and same content, with objects compared by identity.
    pub fn strict_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_eq(y))
            }
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(obj) => write!(f, "object({})", obj.class()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            (-1.0e9f64..1.0e9).prop_map(Value::Float),
            "[a-z0-9]{0,8}".prop_map(Value::Str),
        ]
    }

    // -----------------------------------------------------------------------
    // Strict equality
    // -----------------------------------------------------------------------

    #[test]
    fn no_coercion_between_kinds() {
        let one = Value::Int(1);
        assert_ne!(one, Value::Float(1.0));
        assert_ne!(one, Value::Bool(true));
        assert_ne!(one, Value::from("1"));
        assert_ne!(Value::Null, Value::from(""));
        assert_ne!(Value::Bool(false), Value::Null);
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        let nan = Value::Float(f64::NAN);
        assert_ne!(nan, nan.clone());
    }

    #[test]
    fn lists_compare_structurally() {
        let a = Value::from(vec![Value::Int(1), Value::from("x")]);
        let b = Value::from(vec![Value::Int(1), Value::from("x")]);
        let c = Value::from(vec![Value::Int(1), Value::Float(1.0)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Value::from(vec![Value::Int(1)]));
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = ObjectRef::new(Object::new("Point").with_field("x", 1));
        let b = ObjectRef::new(Object::new("Point").with_field("x", 1));
        assert_eq!(Value::from(a.clone()), Value::from(a.clone()));
        assert_ne!(Value::from(a), Value::from(b));
    }

    #[test]
    fn lists_of_objects_use_identity() {
        let obj = ObjectRef::new(Object::new("Item"));
        let other = ObjectRef::new(Object::new("Item"));
        let a = Value::from(vec![Value::from(obj.clone())]);
        assert_eq!(a, Value::from(vec![Value::from(obj)]));
        assert_ne!(a, Value::from(vec![Value::from(other)]));
    }

    // -----------------------------------------------------------------------
    // Classification and display
    // -----------------------------------------------------------------------

    #[test]
    fn kind_names() {
        assert_eq!(Value::Null.kind().name(), "null");
        assert_eq!(Value::from(2.5).kind().name(), "float");
        assert_eq!(Value::from("s").kind().name(), "string");
        assert_eq!(Value::List(vec![]).kind().name(), "list");
        assert!(ValueKind::Object.is_composite());
        assert!(!ValueKind::Str.is_composite());
    }

    #[test]
    fn display_is_literal() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(-7).to_string(), "-7");
        assert_eq!(Value::from(1.0).to_string(), "1.0");
        assert_eq!(Value::from("a\"b").to_string(), "\"a\\\"b\"");
        assert_eq!(
            Value::from(vec![Value::Int(1), Value::from("x")]).to_string(),
            "[1, \"x\"]"
        );
        let obj = ObjectRef::new(Object::new("DateTime"));
        assert_eq!(Value::from(obj).to_string(), "object(DateTime)");
    }

    #[test]
    fn option_none_is_null() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some(3)), Value::Int(3));
    }

    #[test]
    fn object_field_lookup() {
        let obj = Object::new("User").with_field("name", "ada").with_field("age", 36);
        assert_eq!(obj.field("age"), Some(&Value::Int(36)));
        assert!(obj.field("missing").is_none());
    }

    // -----------------------------------------------------------------------
    // Serde
    // -----------------------------------------------------------------------

    #[test]
    fn serde_roundtrip_creates_fresh_objects() {
        let obj = ObjectRef::new(Object::new("Point").with_field("y", 2.5));
        let value = Value::from(vec![Value::from(obj.clone()), Value::from("tail")]);
        let json = serde_json::to_string(&value).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();

        let Value::List(items) = parsed else {
            panic!("expected a list");
        };
        let Value::Object(copy) = &items[0] else {
            panic!("expected an object");
        };
        assert!(!copy.ptr_eq(&obj));
        assert_eq!(copy.class(), "Point");
        assert_eq!(copy.object().field("y"), Some(&Value::Float(2.5)));
        assert_eq!(items[1], Value::from("tail"));
    }

    proptest! {
        #[test]
        fn scalars_are_reflexive(value in scalar()) {
            prop_assert!(value.strict_eq(&value));
        }

        #[test]
        fn different_kinds_never_equal(a in scalar(), b in scalar()) {
            if a.kind() != b.kind() {
                prop_assert!(!a.strict_eq(&b));
            }
        }
    }
}
