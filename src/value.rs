// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tagged value type stored by properties.
//!
//! Properties in this crate are dynamically shaped: a single storage slot may
//! hold a number, a string, a container, or an opaque user object. [`Value`]
//! is the closed sum type covering those shapes: the accepted input shapes
//! are explicit variants and descriptors match on them, so no runtime type
//! inspection is needed.
//!
//! Equality is structural, with two deliberate exceptions:
//!
//! - `Int` and `Float` compare numerically across kinds (`Value::Int(1)`
//!   equals `Value::Float(1.0)`), which keeps change suppression working
//!   when a numeric property is assigned equivalent values of either kind.
//! - `Object` compares by `Rc` pointer identity, since opaque user types
//!   carry no structural equality of their own.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::cmp::Ordering;
use core::fmt;

use crate::dict::ObservableDict;
use crate::list::ObservableList;

/// A property value.
///
/// Container variants (`List`, `Dict`) are shared handles: cloning a
/// `Value::List` yields another handle to the same underlying sequence, the
/// way the observable wrappers are meant to be passed around.
#[derive(Clone)]
pub enum Value {
    /// The absent value. Legal in a storage slot only when the owning
    /// property was configured with `allow_none`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// A string.
    Str(String),
    /// A fixed, plain sequence. Used for composite values and for the
    /// (magnitude, unit) numeric input shape; never dispatches on mutation.
    Tuple(Vec<Value>),
    /// An observable list handle.
    List(ObservableList),
    /// An observable dict handle.
    Dict(ObservableDict),
    /// An opaque user object, compared by pointer identity.
    Object(Rc<dyn Any>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for `Int` and `Float` values.
    #[must_use]
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Returns the numeric magnitude of an `Int` or `Float` value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string slice of a `Str` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements of a sequence-shaped value (`Tuple` or `List`).
    ///
    /// List contents are snapshotted; mutating the list afterwards does not
    /// affect the returned vector.
    #[must_use]
    pub fn sequence_items(&self) -> Option<Vec<Self>> {
        match self {
            Self::Tuple(items) => Some(items.clone()),
            Self::List(list) => Some(list.to_vec()),
            _ => None,
        }
    }

    /// A short name for the value's shape, used in validation messages.
    #[must_use]
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Object(_) => "object",
        }
    }

    /// Rank used to order values of different shapes in [`Self::total_cmp`].
    fn shape_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Str(_) => 3,
            Self::Tuple(_) => 4,
            Self::List(_) => 5,
            Self::Dict(_) => 6,
            Self::Object(_) => 7,
        }
    }

    /// Best-effort total order over values, used by container sorting.
    ///
    /// Numbers order numerically (mixed int/float included), strings
    /// lexicographically, sequences element-wise. Values of different shapes
    /// order by a fixed shape rank; dicts compare by size and objects
    /// compare equal, so sorting heterogeneous content is stable but only
    /// meaningful within a shape.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::Tuple(a), Self::Tuple(b)) => cmp_sequences(a, b),
            (Self::List(a), Self::List(b)) => cmp_sequences(&a.to_vec(), &b.to_vec()),
            (Self::Dict(a), Self::Dict(b)) => a.len().cmp(&b.len()),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.shape_rank().cmp(&other.shape_rank()),
            },
        }
    }
}

fn cmp_sequences(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.total_cmp(y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            // Mixed numeric kinds compare by magnitude.
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => *a as f64 == *b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::Str(v) => write!(f, "Str({v:?})"),
            Self::Tuple(v) => f.debug_tuple("Tuple").field(v).finish(),
            Self::List(v) => f.debug_tuple("List").field(&v.to_vec()).finish(),
            Self::Dict(v) => write!(f, "Dict(len={})", v.len()),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(String::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn mixed_numeric_equality() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Float(2.5), Value::Float(2.5));
        assert_ne!(Value::Int(1), Value::Float(1.5));
    }

    #[test]
    fn cross_shape_inequality() {
        assert_ne!(Value::Int(0), Value::Null);
        assert_ne!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::Str("1".into()), Value::Int(1));
    }

    #[test]
    fn object_identity_equality() {
        let a: Rc<dyn Any> = Rc::new(5_u8);
        let b: Rc<dyn Any> = Rc::new(5_u8);
        assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn tuple_structural_equality() {
        let a = Value::Tuple(vec![Value::Int(1), Value::Str("x".into())]);
        let b = Value::Tuple(vec![Value::Float(1.0), Value::Str("x".into())]);
        assert_eq!(a, b);
    }

    #[test]
    fn as_f64_extraction() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Str("3".into()).as_f64(), None);
    }

    #[test]
    fn total_cmp_numbers() {
        assert_eq!(Value::Int(1).total_cmp(&Value::Float(2.0)), Ordering::Less);
        assert_eq!(
            Value::Float(2.0).total_cmp(&Value::Int(2)),
            Ordering::Equal
        );
    }

    #[test]
    fn total_cmp_strings_and_shapes() {
        assert_eq!(
            Value::Str("a".into()).total_cmp(&Value::Str("b".into())),
            Ordering::Less
        );
        // Numbers rank below strings.
        assert_eq!(
            Value::Int(999).total_cmp(&Value::Str("a".into())),
            Ordering::Less
        );
    }

    #[test]
    fn from_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(4_i64), Value::Int(4));
        assert_eq!(Value::from(4.0_f64), Value::Float(4.0));
        assert_eq!(Value::from("hi"), Value::Str("hi".into()));
    }
}
