use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use super::path::Path;

/// The instance-independent part of an error entry: its code and message key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ErrorShape {
    code: String,
    message: String,
}

impl ErrorShape {
    #[must_use]
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_owned(),
            message: message.to_owned(),
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Static catalogue of every error shape a compiled plan can produce, by path.
///
/// Collections appear once under `[*]`. Recursive specifications are unrolled
/// one level; below that, a recursion marker maps the site where the
/// specification re-enters itself to the path of its first unrolling.
/// [`contains()`](Self::contains) follows those markers, so every
/// `(path, code)` of any validation result is found in the template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Template {
    entries: BTreeMap<Path, BTreeSet<ErrorShape>>,
    recursions: BTreeMap<Path, Path>,
}

impl Template {
    pub(crate) fn add(&mut self, path: Path, shape: ErrorShape) {
        self.entries.entry(path).or_default().insert(shape);
    }

    /// Record that the subtree at `site` repeats the subtree at `target`.
    pub(crate) fn add_recursion(&mut self, site: Path, target: Path) {
        if site.len() > target.len() {
            self.recursions.insert(site, target);
        }
    }

    /// Shapes recorded directly at `path` (use template paths, with `[*]`).
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&BTreeSet<ErrorShape>> {
        self.entries.get(path)
    }

    /// Whether `code` can be reported at `path`.
    ///
    /// `path` may be a concrete result path: indices are generalized to `[*]`
    /// and recursion markers are followed.
    #[must_use]
    pub fn contains(&self, path: &Path, code: &str) -> bool {
        let mut pending = vec![path.generalize()];
        let mut seen = HashSet::new();
        while let Some(current) = pending.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if self
                .entries
                .get(&current)
                .is_some_and(|shapes| shapes.iter().any(|s| s.code == code))
            {
                return true;
            }
            for (site, target) in &self.recursions {
                if let Some(next) = current.replace_prefix(site, target) {
                    pending.push(next);
                }
            }
        }
        false
    }

    /// All template paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys()
    }

    /// Iterate over `(path, shapes)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &BTreeSet<ErrorShape>)> {
        self.entries.iter()
    }

    /// Recursion markers as `(site, representative path)`.
    #[must_use]
    pub fn recursions(&self) -> &BTreeMap<Path, Path> {
        &self.recursions
    }

    /// Distinct codes across the whole template, sorted.
    #[must_use]
    pub fn codes(&self) -> BTreeSet<&str> {
        self.entries
            .values()
            .flatten()
            .map(|s| s.code.as_str())
            .collect()
    }

    /// Number of paths with at least one shape.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, shapes) in &self.entries {
            for shape in shapes {
                writeln!(f, "{path}: [{}] {}", shape.code, shape.message)?;
            }
        }
        for (site, target) in &self.recursions {
            writeln!(f, "{site}: (recurses to '{target}')")?;
        }
        Ok(())
    }
}
