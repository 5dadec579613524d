mod error;
mod grammar;

pub use error::ParseError;

use crate::Path;

/// Parse the canonical string form of a [`Path`] (`orders[*].total`, `items[3]`, or
/// the empty string for the root).
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a well-formed path.
pub fn parse_path(input: &str) -> Result<Path, ParseError> {
    use winnow::Parser;
    grammar::path
        .parse(input)
        .map_err(|e| ParseError::new(input, e.offset(), e.inner().to_string()))
}
