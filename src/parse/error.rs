use std::fmt;

/// A path string that is not in canonical form, with where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    input: String,
    offset: usize,
    reason: String,
}

impl ParseError {
    pub(crate) fn new(input: &str, offset: usize, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_owned(),
            offset,
            reason: reason.into(),
        }
    }

    /// The rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Byte offset in the input where parsing failed.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid path '{}' at offset {}", self.input, self.offset)?;
        if !self.reason.is_empty() {
            write!(f, ": {}", self.reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ParseError::new("a[", 2, "expected index or '*'");
        assert_eq!(err.to_string(), "invalid path 'a[' at offset 2: expected index or '*'");
        assert_eq!(err.offset(), 2);
        assert_eq!(err.input(), "a[");
    }

    #[test]
    fn error_display_without_reason() {
        let err = ParseError::new("a]", 1, "");
        assert_eq!(err.to_string(), "invalid path 'a]' at offset 1");
    }
}
