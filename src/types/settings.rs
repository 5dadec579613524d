use std::collections::BTreeMap;

use super::message::{english, format_message};
use super::result::ErrorEntry;

pub const DEFAULT_TRANSLATION: &str = "English";
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Validator settings.
///
/// Translations only affect how messages are rendered; `max_depth` only
/// bounds how many times a recursive specification may re-enter itself on
/// one branch. Neither changes which codes a plan can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Settings {
    max_depth: usize,
    default_translation: String,
    translations: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut translations = BTreeMap::new();
        translations.insert(DEFAULT_TRANSLATION.to_owned(), english());
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_translation: DEFAULT_TRANSLATION.to_owned(),
            translations,
        }
    }
}

impl Settings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of nested re-entries of a recursive specification on one branch.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Translation used when a requested translation lacks a key.
    #[must_use]
    pub fn with_default_translation(mut self, name: &str) -> Self {
        self.default_translation = name.to_owned();
        self
    }

    /// Merge `entries` (message key → pattern) into the named translation,
    /// creating it if needed.
    #[must_use]
    pub fn with_translation<K, V>(mut self, name: &str, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let translation = self.translations.entry(name.to_owned()).or_default();
        for (key, text) in entries {
            translation.insert(key.into(), text.into());
        }
        self
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub fn default_translation(&self) -> &str {
        &self.default_translation
    }

    pub fn translation_names(&self) -> impl Iterator<Item = &str> {
        self.translations.keys().map(String::as_str)
    }

    /// Resolve a message key: the named translation, then the default
    /// translation, then the key itself.
    #[must_use]
    pub fn translate<'a>(&'a self, translation: &str, key: &'a str) -> &'a str {
        [translation, self.default_translation.as_str()]
            .into_iter()
            .find_map(|name| self.translations.get(name)?.get(key))
            .map_or(key, String::as_str)
    }

    /// Render an entry's message in the named translation with its arguments bound.
    #[must_use]
    pub fn render(&self, translation: &str, entry: &ErrorEntry) -> String {
        format_message(self.translate(translation, entry.message()), entry.args())
    }
}
