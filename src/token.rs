use serde::{Deserialize, Serialize};

/// A single lexical atom with the line it starts on.
///
/// `quoted` records whether the text came from a `"..."` or `'...'`
/// literal. Quoted tokens are never structural: a quoted `;` is an
/// argument, not a terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub line: usize,
    pub quoted: bool,
}

impl Token {
    /// Create an unquoted token.
    #[must_use]
    pub fn bare(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
            quoted: false,
        }
    }

    /// Create a quoted token.
    #[must_use]
    pub fn quoted(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
            quoted: true,
        }
    }

    /// True for an unquoted `{`, `}` or `;`.
    #[must_use]
    pub fn is_delimiter(&self) -> bool {
        !self.quoted && matches!(self.text.as_str(), "{" | "}" | ";")
    }

    /// True if this is the unquoted delimiter `delim`.
    #[must_use]
    pub fn is(&self, delim: &str) -> bool {
        !self.quoted && self.text == delim
    }

    /// True for an unquoted `#...` comment token.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        !self.quoted && self.text.starts_with('#')
    }
}
