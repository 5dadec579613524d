use std::cmp::Ordering;
use std::fmt;

use super::check::CompareOp;
use super::object::Object;

/// A model value as seen by the validation engine.
///
/// Typed models are presented to the engine through this tree, either built
/// directly or produced by a [`Model`](super::Model) implementation.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    /// No value. Treated as absent by presence rules.
    #[default]
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// An ordered collection of values.
    List(Vec<Value>),
    /// A string-keyed set of member values.
    Object(Object),
}

impl Value {
    /// Evaluate `self <op> other`.
    ///
    /// Numbers order across `Int` and `Float`, strings lexicographically.
    /// Booleans support `Eq` and `Neq` only. Any other pairing is `None`.
    #[must_use]
    pub fn compare(&self, op: CompareOp, other: &Value) -> Option<bool> {
        if let (Value::Bool(a), Value::Bool(b)) = (self, other) {
            return match op {
                CompareOp::Eq => Some(a == b),
                CompareOp::Neq => Some(a != b),
                _ => None,
            };
        }
        let ordering = self.ordering(other)?;
        Some(match op {
            CompareOp::Eq => ordering.is_eq(),
            CompareOp::Neq => ordering.is_ne(),
            CompareOp::Gt => ordering.is_gt(),
            CompareOp::Gte => ordering.is_ge(),
            CompareOp::Lt => ordering.is_lt(),
            CompareOp::Lte => ordering.is_le(),
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn ordering(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
            _ => None,
        }
    }

    /// Whether this value counts as absent for presence rules.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Look up a member of an object value. Non-objects have no members.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(object) => object.get(name),
            _ => None,
        }
    }

    /// The elements of a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Length of a string (in chars), list, or object. `None` for scalars.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::List(items) => Some(items.len()),
            Value::Object(object) => Some(object.len()),
            _ => None,
        }
    }
}

/// A typed model that can be presented to the engine as a [`Value`] tree.
///
/// ```
/// use vouch::{Model, Object, Value};
///
/// struct Person {
///     name: String,
///     age: i64,
/// }
///
/// impl Model for Person {
///     fn to_value(&self) -> Value {
///         Object::new()
///             .set("name", self.name.as_str())
///             .set("age", self.age)
///             .into()
///     }
/// }
/// ```
pub trait Model {
    fn to_value(&self) -> Value;
}

impl Model for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl Model for Object {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(object) => write!(f, "{object}"),
        }
    }
}
