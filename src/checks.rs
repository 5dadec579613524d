//! Built-in checks.
//!
//! Every constructor returns a [`Check`] with a stable code and a message key
//! from the built-in `English` translation. Values of a kind the check cannot
//! interpret (e.g. `gt(0)` on a string) fail the check.

use crate::types::message;
use crate::{Check, CompareOp, Value};

fn compare(code: &str, key: &str, arg: &str, op: CompareOp, bound: Value) -> Check {
    let expected = bound.clone();
    Check::new(code, key, move |v| v.compare(op, &expected).unwrap_or(false)).with_arg(arg, bound)
}

/// Value must equal `value`. Numbers compare across `Int` and `Float`.
#[must_use]
pub fn eq(value: impl Into<Value>) -> Check {
    compare("EqualTo", message::EQUAL_TO, "value", CompareOp::Eq, value.into())
}

#[must_use]
pub fn neq(value: impl Into<Value>) -> Check {
    let bound = value.into();
    let expected = bound.clone();
    // Incomparable kinds are trivially "not equal".
    Check::new("NotEqualTo", message::NOT_EQUAL_TO, move |v| {
        v.compare(CompareOp::Neq, &expected).unwrap_or(true)
    })
    .with_arg("value", bound)
}

#[must_use]
pub fn gt(min: impl Into<Value>) -> Check {
    compare("GreaterThan", message::GREATER_THAN, "min", CompareOp::Gt, min.into())
}

#[must_use]
pub fn gte(min: impl Into<Value>) -> Check {
    compare(
        "GreaterThanOrEqualTo",
        message::GREATER_THAN_OR_EQUAL_TO,
        "min",
        CompareOp::Gte,
        min.into(),
    )
}

#[must_use]
pub fn lt(max: impl Into<Value>) -> Check {
    compare("LessThan", message::LESS_THAN, "max", CompareOp::Lt, max.into())
}

#[must_use]
pub fn lte(max: impl Into<Value>) -> Check {
    compare(
        "LessThanOrEqualTo",
        message::LESS_THAN_OR_EQUAL_TO,
        "max",
        CompareOp::Lte,
        max.into(),
    )
}

/// Value must lie in `min..=max`.
#[must_use]
pub fn between(min: impl Into<Value>, max: impl Into<Value>) -> Check {
    let (min, max) = (min.into(), max.into());
    let (lo, hi) = (min.clone(), max.clone());
    Check::new("Between", message::BETWEEN, move |v| {
        v.compare(CompareOp::Gte, &lo).unwrap_or(false)
            && v.compare(CompareOp::Lte, &hi).unwrap_or(false)
    })
    .with_arg("min", min)
    .with_arg("max", max)
}

/// Value must equal one of `values`.
#[must_use]
pub fn one_of<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Check {
    let allowed: Vec<Value> = values.into_iter().map(Into::into).collect();
    let listed = Value::List(allowed.clone());
    Check::new("OneOf", message::ONE_OF, move |v| {
        allowed
            .iter()
            .any(|a| v.compare(CompareOp::Eq, a).unwrap_or(false))
    })
    .with_arg("values", listed)
}

/// String, list, or object must have at least one char, element, or member.
#[must_use]
pub fn not_empty() -> Check {
    Check::new("NotEmpty", message::NOT_EMPTY, |v| {
        v.len().is_some_and(|len| len > 0)
    })
}

#[must_use]
pub fn min_length(min: usize) -> Check {
    Check::new("MinLength", message::MIN_LENGTH, move |v| {
        text_len(v).is_some_and(|len| len >= min)
    })
    .with_arg("min", count(min))
}

#[must_use]
pub fn max_length(max: usize) -> Check {
    Check::new("MaxLength", message::MAX_LENGTH, move |v| {
        text_len(v).is_some_and(|len| len <= max)
    })
    .with_arg("max", count(max))
}

#[must_use]
pub fn length_between(min: usize, max: usize) -> Check {
    Check::new("LengthBetween", message::LENGTH_BETWEEN, move |v| {
        text_len(v).is_some_and(|len| (min..=max).contains(&len))
    })
    .with_arg("min", count(min))
    .with_arg("max", count(max))
}

#[must_use]
pub fn min_items(min: usize) -> Check {
    Check::new("MinItems", message::MIN_ITEMS, move |v| {
        v.as_list().is_some_and(|items| items.len() >= min)
    })
    .with_arg("min", count(min))
}

#[must_use]
pub fn max_items(max: usize) -> Check {
    Check::new("MaxItems", message::MAX_ITEMS, move |v| {
        v.as_list().is_some_and(|items| items.len() <= max)
    })
    .with_arg("max", count(max))
}

/// A custom check. Shorthand for [`Check::new`].
pub fn predicate(
    code: &str,
    message: &str,
    f: impl Fn(&Value) -> bool + Send + Sync + 'static,
) -> Check {
    Check::new(code, message, f)
}

fn text_len(v: &Value) -> Option<usize> {
    v.as_str().map(|s| s.chars().count())
}

fn count(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}
