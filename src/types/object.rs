use std::collections::BTreeMap;
use std::fmt;

use super::Value;

/// A string-keyed set of member values.
///
/// Supports building nested objects from dot-separated paths like
/// `"customer.address.city"`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Object {
    members: BTreeMap<String, Value>,
}

impl Object {
    /// Create an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value at a dot-separated path. Creates intermediate objects as needed.
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value.into());
        self
    }

    /// Insert a value at a dot-separated path (mutable reference version).
    pub fn insert(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        Self::insert_recursive(&mut self.members, &segments, value);
    }

    /// Look up a direct member by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }

    /// Look up a value by dot-separated path.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let segments: Vec<&str> = path.split('.').collect();
        Self::get_recursive(&self.members, &segments)
    }

    /// Number of direct members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate over direct members in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn insert_recursive(map: &mut BTreeMap<String, Value>, segments: &[&str], value: Value) {
        match segments {
            [] => {}
            [last] => {
                map.insert((*last).to_owned(), value);
            }
            [first, rest @ ..] => {
                let entry = map
                    .entry((*first).to_owned())
                    .or_insert_with(|| Value::Object(Object::new()));
                match entry {
                    Value::Object(nested) => {
                        Self::insert_recursive(&mut nested.members, rest, value);
                    }
                    _ => {
                        let mut nested = Object::new();
                        Self::insert_recursive(&mut nested.members, rest, value);
                        *entry = Value::Object(nested);
                    }
                }
            }
        }
    }

    fn get_recursive<'a>(map: &'a BTreeMap<String, Value>, segments: &[&str]) -> Option<&'a Value> {
        match segments {
            [] => None,
            [last] => map.get(*last),
            [first, rest @ ..] => match map.get(*first)? {
                Value::Object(nested) => Self::get_recursive(&nested.members, rest),
                _ => None,
            },
        }
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}
