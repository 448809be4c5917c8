//! Quoting codec: when an argument must be quoted, how to quote it,
//! and how a quoted literal decodes back to its logical value.
//!
//! Inside a quoted literal every `\c` decodes to `c`, except within a
//! `${...}` expansion, which is kept verbatim up to its closing `}`.
//! [`enquote`] produces the minimal literal that decodes back to the
//! original value.

use std::borrow::Cow;

use crate::cursor::{Cursor, Unit};
use crate::lexer::LexErrorKind;

/// Return true when `value` cannot be written as a bare word.
///
/// A value needs quoting when it is empty, starts with whitespace, a
/// structural delimiter, a quote, `#` or `${`, contains whitespace,
/// `{`, `;` or a quote, has an unbalanced `}` or `${`, or ends inside
/// an expansion or on a lone `\` or `$`.
#[must_use]
pub fn needs_quoting(value: &str) -> bool {
    let mut units = Cursor::new(value);
    let Some(first) = units.next_unit() else {
        return true;
    };
    if first.is_space()
        || first == Unit::Expand
        || matches!(first, Unit::Char('{' | '}' | ';' | '"' | '\'' | '#'))
    {
        return true;
    }

    let mut expanding = false;
    let mut last = first;
    for unit in units {
        match unit {
            u if u.is_space() => return true,
            Unit::Char('{' | ';' | '"' | '\'') => return true,
            Unit::Char('}') if !expanding => return true,
            Unit::Char('}') => expanding = false,
            Unit::Expand if expanding => return true,
            Unit::Expand => expanding = true,
            _ => {}
        }
        last = unit;
    }

    expanding || last.is_dangling()
}

/// Render `value` as a token: unchanged when it is a valid bare word,
/// otherwise as a double-quoted literal escaping only `\` and `"`.
#[must_use]
pub fn enquote(value: &str) -> Cow<'_, str> {
    if !needs_quoting(value) {
        return Cow::Borrowed(value);
    }

    let units: Vec<Unit> = Cursor::new(value).collect();
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');

    let mut i = 0;
    while i < units.len() {
        match units[i] {
            Unit::Expand => {
                let close = units[i + 1..].iter().position(|u| u.is_char('}'));
                if let Some(close) = close {
                    let end = i + 1 + close;
                    for unit in &units[i..=end] {
                        unit.push_verbatim(&mut out);
                    }
                    i = end + 1;
                    continue;
                }
                // an unterminated `${` must not reopen an expansion
                out.push_str("$\\{");
            }
            Unit::Char(c) => push_escaped(&mut out, c),
            Unit::Escape(c) => {
                out.push_str("\\\\");
                push_escaped(&mut out, c);
            }
        }
        i += 1;
    }

    out.push('"');
    Cow::Owned(out)
}

fn push_escaped(out: &mut String, c: char) {
    // a `$` already written would fuse with `{` into an expansion
    let after_dollar = out.ends_with('$');
    match c {
        '\\' | '"' => out.push('\\'),
        '{' if after_dollar => out.push('\\'),
        _ => {}
    }
    out.push(c);
}

/// Decode the body of a quoted literal whose opening `delim` has
/// already been consumed. Stops after the closing delimiter.
///
/// # Errors
///
/// Fails when the input ends before the literal or an expansion
/// inside it is closed.
pub(crate) fn read_quoted(cursor: &mut Cursor<'_>, delim: char) -> Result<String, LexErrorKind> {
    let mut value = String::new();
    let mut expanding = false;

    loop {
        let Some(unit) = cursor.next_unit() else {
            return Err(if expanding {
                LexErrorKind::UnterminatedExpansion
            } else {
                LexErrorKind::UnterminatedQuote { delim }
            });
        };

        if expanding {
            unit.push_verbatim(&mut value);
            if unit.is_char('}') {
                expanding = false;
            }
            continue;
        }

        match unit {
            Unit::Char(c) if c == delim => return Ok(value),
            Unit::Char(c) | Unit::Escape(c) => value.push(c),
            Unit::Expand => {
                value.push_str("${");
                expanding = true;
            }
        }
    }
}

/// Decode a complete token as written in a config file.
///
/// A literal wrapped in `"` or `'` is decoded; anything else is
/// returned unchanged, since bare words keep their escapes.
///
/// # Errors
///
/// Fails on an unterminated literal or trailing text after the
/// closing quote.
pub fn dequote(written: &str) -> Result<Cow<'_, str>, LexErrorKind> {
    let mut cursor = Cursor::new(written);
    let delim = match cursor.peek_char() {
        Some(c @ ('"' | '\'')) => c,
        _ => return Ok(Cow::Borrowed(written)),
    };
    cursor.next_char();
    let value = read_quoted(&mut cursor, delim)?;
    if cursor.is_eof() {
        Ok(Cow::Owned(value))
    } else {
        Err(LexErrorKind::TrailingAfterQuote)
    }
}
