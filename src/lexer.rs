use std::collections::VecDeque;

use crate::cursor::{Cursor, Unit};
use crate::ext::Extensions;
use crate::quoting;
use crate::token::Token;

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    /// End of input inside a `"` or `'` literal.
    #[error("unterminated quoted string, expecting {delim}")]
    UnterminatedQuote { delim: char },
    /// End of input inside a `${...}` expansion.
    #[error("unterminated variable expansion, expecting \"}}\"")]
    UnterminatedExpansion,
    /// End of input right after a lone `\` or `$`.
    #[error("unexpected end of file after \"{0}\"")]
    DanglingEscape(char),
    /// Text after the closing quote of a literal passed to
    /// [`quoting::dequote`].
    #[error("unexpected text after closing quote")]
    TrailingAfterQuote,
    /// Error reported by a lexer extension.
    #[error("{0}")]
    Extension(String),
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
}

/// Tokenize a configuration source string.
///
/// # Errors
///
/// Returns `LexError` on unterminated literals or expansions.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).collect()
}

/// Lazy token scanner over one configuration source.
///
/// Yields comments as tokens starting with `#`, the delimiters `{`,
/// `}` and `;` as their own tokens, and every other word or literal
/// with its logical value. Iteration stops after the first error.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    extensions: Option<&'a Extensions>,
    pending: VecDeque<Token>,
    directive_next: bool,
    failed: bool,
}

impl<'a> Lexer<'a> {
    /// Scan `input` with no lexer extensions.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
        Self {
            cursor: Cursor::new(input),
            extensions: None,
            pending: VecDeque::new(),
            directive_next: true,
            failed: false,
        }
    }

    /// Scan `input`, handing directives registered in `extensions`
    /// over to their custom lexers.
    #[must_use]
    pub fn with_extensions(input: &'a str, extensions: &'a Extensions) -> Self {
        Self {
            extensions: Some(extensions),
            ..Self::new(input)
        }
    }

    fn scan(&mut self) -> Result<Option<Token>, LexError> {
        self.cursor.skip_whitespace();
        let line = self.cursor.line();

        let Some(c) = self.cursor.peek_char() else {
            return Ok(None);
        };

        match c {
            '#' => {
                let text = self.cursor.read_line();
                Ok(Some(Token::bare(text, line)))
            }
            '{' | '}' | ';' => {
                self.cursor.next_char();
                self.directive_next = true;
                Ok(Some(Token::bare(c.to_string(), line)))
            }
            '"' | '\'' => {
                self.cursor.next_char();
                let text = quoting::read_quoted(&mut self.cursor, c)
                    .map_err(|kind| LexError { kind, line })?;
                self.finish_word(Token::quoted(text, line)).map(Some)
            }
            _ => {
                let word = self.read_word(line)?;
                self.finish_word(word).map(Some)
            }
        }
    }

    fn read_word(&mut self, line: usize) -> Result<Token, LexError> {
        let mut text = String::new();
        let mut expanding = false;
        let mut last = None;

        while let Some(unit) = self.cursor.peek_unit() {
            if expanding {
                if unit.is_char('}') {
                    expanding = false;
                }
            } else {
                match unit {
                    u if u.is_space() => break,
                    Unit::Char('{' | '}' | ';') => break,
                    Unit::Expand => expanding = true,
                    _ => {}
                }
            }
            self.cursor.next_unit();
            unit.push_verbatim(&mut text);
            last = Some(unit);
        }

        if expanding {
            return Err(LexError {
                kind: LexErrorKind::UnterminatedExpansion,
                line,
            });
        }
        let dangling = last.filter(|u| u.is_dangling() && self.cursor.is_eof());
        if let Some(Unit::Char(c)) = dangling {
            return Err(LexError {
                kind: LexErrorKind::DanglingEscape(c),
                line,
            });
        }

        Ok(Token::bare(text, line))
    }

    fn finish_word(&mut self, token: Token) -> Result<Token, LexError> {
        let extension = self
            .extensions
            .filter(|_| self.directive_next)
            .and_then(|exts| exts.get(&token.text));

        if let Some(extension) = extension {
            let custom = extension.lex(&mut self.cursor, &token.text)?;
            self.pending.extend(custom);
            self.directive_next = true;
        } else {
            self.directive_next = false;
        }

        Ok(token)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.pop_front() {
            return Some(Ok(token));
        }
        if self.failed {
            return None;
        }
        match self.scan() {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
