//! Script-literal escaping
//!
//! JSON payloads travel into the runtime as the single argument of a call
//! expression, e.g. `calculateAstrolabe('{"year":1990}')`. The payload must
//! therefore survive being wrapped in a single-quoted script string literal.

use serde::{Deserialize, Serialize};

/// Which characters are escaped before embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapeStyle {
    /// Backslash, single quote and double quote.
    Quotes,
    /// `Quotes` plus newline and carriage return.
    #[default]
    QuotesAndLineBreaks,
}

/// Escape `raw` so that `'` + result + `'` is a valid script string literal
/// evaluating back to `raw`.
///
/// With [`EscapeStyle::Quotes`] a raw line break is passed through untouched,
/// which is only safe for compact JSON (serde never emits raw line breaks).
pub fn escape_single_quoted(raw: &str, style: EscapeStyle) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 8 + 2);
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' if style == EscapeStyle::QuotesAndLineBreaks => out.push_str("\\n"),
            '\r' if style == EscapeStyle::QuotesAndLineBreaks => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape_single_quoted`], following script string-literal rules
/// for the escapes it produces. Unknown escapes yield the escaped character.
///
/// Returns `None` for text that could not appear inside a single-quoted
/// literal: a bare `'`, a dangling backslash, or a raw line break.
pub fn unescape_single_quoted(literal: &str) -> Option<String> {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                '0' => out.push('\0'),
                other => out.push(other),
            },
            '\'' | '\n' | '\r' => return None,
            other => out.push(other),
        }
    }
    Some(out)
}
