//! Character cursor shared by the lexer, the quoting codec, and
//! lexer extensions.
//!
//! The cursor hands out *atomic units*: a backslash together with
//! the character it escapes, the two-character `${` that opens a
//! variable expansion, or any other single character. Every piece of
//! code that decides where a token may be split walks the same units,
//! so the scanner and the quoting codec can never disagree about what
//! an escape or an expansion is.

use std::fmt::Write as _;

/// One indivisible piece of configuration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Any character that is not part of a larger unit. A trailing
    /// lone `\` or a `$` not followed by `{` also lands here.
    Char(char),
    /// `\` followed by the escaped character.
    Escape(char),
    /// `${`, the opener of a variable expansion.
    Expand,
}

impl Unit {
    /// Append the unit exactly as it was written.
    pub fn push_verbatim(self, out: &mut String) {
        match self {
            Self::Char(c) => out.push(c),
            Self::Escape(c) => {
                out.push('\\');
                out.push(c);
            }
            Self::Expand => out.push_str("${"),
        }
    }

    /// True for a bare whitespace character.
    #[must_use]
    pub const fn is_space(self) -> bool {
        matches!(self, Self::Char(c) if c.is_whitespace())
    }

    /// True for the bare character `c`.
    #[must_use]
    pub const fn is_char(self, c: char) -> bool {
        matches!(self, Self::Char(x) if x == c)
    }

    /// True for a lone `\` or `$` that ends the input.
    #[must_use]
    pub const fn is_dangling(self) -> bool {
        matches!(self, Self::Char('\\' | '$'))
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Char(c) => f.write_char(*c),
            Self::Escape(c) => write!(f, "\\{c}"),
            Self::Expand => f.write_str("${"),
        }
    }
}

/// Forward-only cursor over configuration text with line tracking.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    /// Start at the beginning of `input`, on line 1.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
        }
    }

    /// The 1-based line of the next unread character.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// True when every character has been consumed.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Look at the next character without consuming it.
    #[must_use]
    pub fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Consume and return the next character.
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Consume the next character if it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    /// Skip whitespace, returning how many characters were skipped.
    pub fn skip_whitespace(&mut self) -> usize {
        let mut skipped = 0;
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.next_char();
            skipped += 1;
        }
        skipped
    }

    /// Look at the next atomic unit without consuming it.
    #[must_use]
    pub fn peek_unit(&self) -> Option<Unit> {
        self.clone().next_unit()
    }

    /// Consume and return the next atomic unit.
    pub fn next_unit(&mut self) -> Option<Unit> {
        let c = self.next_char()?;
        let unit = match c {
            '\\' => self.next_char().map_or(Unit::Char('\\'), Unit::Escape),
            '$' if self.eat('{') => Unit::Expand,
            c => Unit::Char(c),
        };
        Some(unit)
    }

    /// Read the rest of the current line, excluding the newline and
    /// any carriage return before it. The newline itself is left
    /// unconsumed.
    pub fn read_line(&mut self) -> &'a str {
        let rest = &self.input[self.pos..];
        let len = rest.find('\n').unwrap_or(rest.len());
        self.pos += len;
        rest[..len].strip_suffix('\r').unwrap_or(&rest[..len])
    }
}

impl Iterator for Cursor<'_> {
    type Item = Unit;

    fn next(&mut self) -> Option<Unit> {
        self.next_unit()
    }
}

/// Split `value` into atomic units.
#[must_use]
pub fn units(value: &str) -> Vec<Unit> {
    Cursor::new(value).collect()
}
