//! Key and value kinds for anykey containers.
//!
//! A [`Value`] is a closed tagged variant over every kind a container can
//! hold or be keyed by. Equality between values is decided per kind, never
//! by run-time coercion:
//!
//! - scalars (`Null`, `Bool`, `Int`, `Float`, `Str`) compare by kind and content
//! - `List` compares element-wise with the same rules
//! - `Object` compares by instance identity through [`ObjectRef`]
//!
//! # Key Types
//!
//! - [`Value`] — any key or value
//! - [`ValueKind`] — classification used by key policies and error messages
//! - [`Object`] / [`ObjectRef`] — opaque reference values

pub mod value;

pub use value::{Object, ObjectRef, Value, ValueKind};
