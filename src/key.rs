//! Sort key extraction.
//!
//! A key is a view of a line: the whole line or one field of it, optionally
//! stripped of leading blanks and case-folded. Folding is the only step that
//! allocates; the emitted line itself is never touched.

use crate::config::{Delimiter, SortConfig};
use std::borrow::Cow;

/// Return field `field` (1-based) of `line`, or `""` when the line has
/// fewer fields. Field 0 is the whole line.
pub fn select_field<'a>(line: &'a str, field: usize, delimiter: &Delimiter) -> &'a str {
    if field == 0 {
        return line;
    }

    let index = field - 1;
    let selected = match delimiter {
        Delimiter::Whitespace => line.split_whitespace().nth(index),
        Delimiter::Literal(sep) => line.split(sep.as_str()).nth(index),
    };
    selected.unwrap_or("")
}

/// Strip leading spaces and tabs.
#[inline]
pub fn skip_leading_blanks(s: &str) -> &str {
    s.trim_start_matches([' ', '\t'])
}

/// Derive the comparison key for `line` under `config`.
///
/// Order matters: the field is selected first, blanks are trimmed from the
/// selected field, then the result is folded.
pub fn extract_key<'a>(line: &'a str, config: &SortConfig) -> Cow<'a, str> {
    let mut key = select_field(line, config.field, &config.delimiter);

    if config.ignore_leading_blanks {
        key = skip_leading_blanks(key);
    }

    if config.ignore_case {
        Cow::Owned(key.to_lowercase())
    } else {
        Cow::Borrowed(key)
    }
}
