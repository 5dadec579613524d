use std::collections::BTreeMap;
use std::fmt;

use super::message::format_message;
use super::path::Path;
use super::settings::Settings;
use super::Value;

/// One violation found while validating a model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ErrorEntry {
    code: String,
    path: Path,
    message: String,
    args: BTreeMap<String, Value>,
}

impl ErrorEntry {
    pub(crate) fn new(
        code: &str,
        path: Path,
        message: &str,
        args: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            code: code.to_owned(),
            path,
            message: message.to_owned(),
            args,
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The message key (or literal pattern) before translation.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn args(&self) -> &BTreeMap<String, Value> {
        &self.args
    }
}

/// Path-indexed collection of every violation found in one validation run.
///
/// Entries at a path keep evaluation order. A fresh result is built for every
/// run and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationResult {
    errors: BTreeMap<Path, Vec<ErrorEntry>>,
}

impl ValidationResult {
    pub(crate) fn push(&mut self, entry: ErrorEntry) {
        self.errors.entry(entry.path.clone()).or_default().push(entry);
    }

    /// `true` when no violation was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn any_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Entries reported at exactly `path` (a concrete path, with indices).
    #[must_use]
    pub fn get(&self, path: &Path) -> &[ErrorEntry] {
        self.errors.get(path).map_or(&[], Vec::as_slice)
    }

    /// Paths with at least one entry, in path order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.errors.keys()
    }

    /// Every entry, grouped by path in path order.
    pub fn entries(&self) -> impl Iterator<Item = &ErrorEntry> {
        self.errors.values().flatten()
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Distinct codes, taken from the entries in path order.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        let mut codes = Vec::new();
        for entry in self.entries() {
            if !codes.contains(&entry.code.as_str()) {
                codes.push(entry.code.as_str());
            }
        }
        codes
    }

    /// Codes per path string.
    #[must_use]
    pub fn code_map(&self) -> BTreeMap<String, Vec<&str>> {
        self.errors
            .iter()
            .map(|(path, entries)| {
                let codes = entries.iter().map(|e| e.code.as_str()).collect();
                (path.to_string(), codes)
            })
            .collect()
    }

    /// Rendered messages per path string, using the named translation
    /// (falling back to the settings' default translation, then the raw key).
    #[must_use]
    pub fn messages(&self, settings: &Settings, translation: &str) -> BTreeMap<String, Vec<String>> {
        self.errors
            .iter()
            .map(|(path, entries)| {
                let messages = entries
                    .iter()
                    .map(|e| settings.render(translation, e))
                    .collect();
                (path.to_string(), messages)
            })
            .collect()
    }
}

impl fmt::Display for ValidationResult {
    /// One line per entry: `path: message`, arguments substituted into the raw key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "valid");
        }
        for entry in self.entries() {
            let text = format_message(&entry.message, &entry.args);
            if entry.path.is_root() {
                writeln!(f, "{text}")?;
            } else {
                writeln!(f, "{}: {text}", entry.path)?;
            }
        }
        Ok(())
    }
}
