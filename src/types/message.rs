//! Message keys used by the built-in checks and their English texts.

use std::collections::BTreeMap;

use super::Value;

pub const REQUIRED: &str = "Global.Required";
pub const FORBIDDEN: &str = "Global.Forbidden";
pub const NOT_EMPTY: &str = "Texts.NotEmpty";
pub const MIN_LENGTH: &str = "Texts.MinLength";
pub const MAX_LENGTH: &str = "Texts.MaxLength";
pub const LENGTH_BETWEEN: &str = "Texts.LengthBetween";
pub const EQUAL_TO: &str = "Values.EqualTo";
pub const NOT_EQUAL_TO: &str = "Values.NotEqualTo";
pub const ONE_OF: &str = "Values.OneOf";
pub const GREATER_THAN: &str = "Numbers.GreaterThan";
pub const GREATER_THAN_OR_EQUAL_TO: &str = "Numbers.GreaterThanOrEqualTo";
pub const LESS_THAN: &str = "Numbers.LessThan";
pub const LESS_THAN_OR_EQUAL_TO: &str = "Numbers.LessThanOrEqualTo";
pub const BETWEEN: &str = "Numbers.Between";
pub const MIN_ITEMS: &str = "Collections.MinItems";
pub const MAX_ITEMS: &str = "Collections.MaxItems";

/// The built-in `English` translation.
pub(crate) fn english() -> BTreeMap<String, String> {
    [
        (REQUIRED, "Required"),
        (FORBIDDEN, "Forbidden"),
        (NOT_EMPTY, "Must not be empty"),
        (MIN_LENGTH, "Must be at least {min} characters in length"),
        (MAX_LENGTH, "Must be at most {max} characters in length"),
        (
            LENGTH_BETWEEN,
            "Must be between {min} and {max} characters in length",
        ),
        (EQUAL_TO, "Must be equal to {value}"),
        (NOT_EQUAL_TO, "Must not be equal to {value}"),
        (ONE_OF, "Must be one of {values}"),
        (GREATER_THAN, "Must be greater than {min}"),
        (GREATER_THAN_OR_EQUAL_TO, "Must be greater than or equal to {min}"),
        (LESS_THAN, "Must be less than {max}"),
        (LESS_THAN_OR_EQUAL_TO, "Must be less than or equal to {max}"),
        (BETWEEN, "Must be between {min} and {max} (inclusive)"),
        (MIN_ITEMS, "Must contain at least {min} items"),
        (MAX_ITEMS, "Must contain at most {max} items"),
    ]
    .into_iter()
    .map(|(key, text)| (key.to_owned(), text.to_owned()))
    .collect()
}

/// Substitute `{name}` placeholders in `pattern` with the bound arguments.
///
/// Placeholders without a matching argument are kept verbatim, as is an
/// unterminated `{`.
#[must_use]
pub fn format_message(pattern: &str, args: &BTreeMap<String, Value>) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match args.get(name) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
