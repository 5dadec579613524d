use thiserror::Error;

use crate::parse::ParseError;

/// Specification authoring errors, raised while compiling a plan.
///
/// Paths are relative to the root of the specification named in `spec`.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unresolved specification reference '{reference}' at '{path}' in '{spec}'")]
    UnresolvedSpecification {
        spec: String,
        path: String,
        reference: String,
    },

    #[error("conflicting presence rules at '{path}' in '{spec}'")]
    ConflictingPresence { spec: String, path: String },

    #[error("presence rule inside a condition at '{path}' in '{spec}'; guard the member instead")]
    GuardedPresence { spec: String, path: String },

    #[error("duplicate specification name '{name}'")]
    DuplicateSpecification { name: String },

    /// A reference cycle that re-enters a specification at the path where it
    /// was entered. Bounding it at run time would add the same entries to one
    /// path on every re-entry, so it is rejected instead.
    #[error("specification cycle does not descend into the model: {}", path.join(" -> "))]
    NonDescendingCycle { path: Vec<String> },

    /// A member name that is empty or contains `.`, `[` or `]` and so would
    /// not render as a distinct path.
    #[error("invalid member name '{name}' at '{path}' in '{spec}'")]
    InvalidMemberName {
        spec: String,
        path: String,
        name: String,
    },

    #[error("invalid check path '{at}' at '{path}' in '{spec}'")]
    InvalidPath {
        spec: String,
        path: String,
        at: String,
        #[source]
        source: ParseError,
    },
}
