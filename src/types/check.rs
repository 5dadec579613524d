use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::template::ErrorShape;
use super::Value;

/// Comparison operators supported by the built-in value checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;

/// A single rule evaluated against the value at its scope.
///
/// A check carries the error code and message key reported when it fails,
/// plus named arguments (e.g. `min`, `max`) bound when the check is built.
/// The predicate receives the scope's value, which for an object scope is the
/// whole object, so cross-field rules are ordinary checks; use
/// [`at()`](Self::at) to report them at a member.
#[derive(Clone)]
pub struct Check {
    code: String,
    message: String,
    args: BTreeMap<String, Value>,
    at: Option<String>,
    predicate: Arc<PredicateFn>,
}

impl Check {
    /// Build a check from a code, a message key (or literal message), and a predicate
    /// that returns `true` when the value is valid.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            args: BTreeMap::new(),
            at: None,
            predicate: Arc::new(predicate),
        }
    }

    /// Bind a named argument, available as `{name}` in the message.
    #[must_use]
    pub fn with_arg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.args.insert(name.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Report failures at a path relative to the check's scope, e.g. `"confirm"`
    /// or `"lines[*].sku"`. The path is parsed when the specification is compiled.
    #[must_use]
    pub fn at(mut self, path: &str) -> Self {
        self.at = Some(path.to_owned());
        self
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn args(&self) -> &BTreeMap<String, Value> {
        &self.args
    }

    pub(crate) fn relocation(&self) -> Option<&str> {
        self.at.as_deref()
    }

    #[inline]
    pub(crate) fn passes(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }

    pub(crate) fn shape(&self) -> ErrorShape {
        ErrorShape::new(&self.code, &self.message)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("code", &self.code)
            .field("message", &self.message)
            .field("args", &self.args)
            .field("at", &self.at)
            .finish_non_exhaustive()
    }
}

/// Predicate deciding whether the rules of a [`Conditional`](super::RuleNode::Conditional)
/// apply to the current value.
#[derive(Clone)]
pub struct Guard(Arc<PredicateFn>);

impl Guard {
    pub fn new(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    #[inline]
    pub(crate) fn holds(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

/// Presence policy of a scope (the root, a member, or a collection element).
///
/// A value is absent when it is missing or [`Value::Null`]. Scopes without a
/// declared policy are [`Optional`](Presence::Optional).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Presence {
    /// Absent values are skipped without an entry.
    #[default]
    Optional,
    /// Absent values produce an entry; present values are validated.
    Required { code: String, message: String },
    /// Present values produce an entry; absent values are skipped.
    Forbidden { code: String, message: String },
}

impl Presence {
    #[must_use]
    pub fn required() -> Self {
        Presence::Required {
            code: "Required".to_owned(),
            message: super::message::REQUIRED.to_owned(),
        }
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Presence::Forbidden {
            code: "Forbidden".to_owned(),
            message: super::message::FORBIDDEN.to_owned(),
        }
    }

    /// Override the message key of a `Required` or `Forbidden` policy.
    #[must_use]
    pub fn with_message(mut self, new_message: impl Into<String>) -> Self {
        if let Presence::Required { message, .. } | Presence::Forbidden { message, .. } =
            &mut self
        {
            *message = new_message.into();
        }
        self
    }

    /// Override the code of a `Required` or `Forbidden` policy.
    #[must_use]
    pub fn with_code(mut self, new_code: impl Into<String>) -> Self {
        if let Presence::Required { code, .. } | Presence::Forbidden { code, .. } = &mut self {
            *code = new_code.into();
        }
        self
    }

    pub(crate) fn same_kind(&self, other: &Presence) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub(crate) fn shape(&self) -> Option<ErrorShape> {
        match self {
            Presence::Optional => None,
            Presence::Required { code, message } | Presence::Forbidden { code, message } => {
                Some(ErrorShape::new(code, message))
            }
        }
    }
}
