use std::fmt;

use serde::{Deserialize, Serialize};

/// Directive name used for comment statements.
pub const COMMENT: &str = "#";

/// A directive, its arguments, and its optional block.
///
/// A comment is a statement whose directive is `#`; its text (after
/// the `#`) is in `comment` and it has no arguments and no block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub directive: String,
    #[serde(default)]
    pub line: usize,
    #[serde(default)]
    pub args: Vec<String>,
    /// Indices into the response's `config` list of the files an
    /// `include` pulled in. Absent once includes are combined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Vec<Self>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Origin file, set when includes are combined into one tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Statement {
    /// Create a leaf statement with no arguments.
    #[must_use]
    pub fn new(directive: impl Into<String>) -> Self {
        Self {
            directive: directive.into(),
            line: 0,
            args: Vec::new(),
            includes: None,
            block: None,
            comment: None,
            file: None,
        }
    }

    /// Create a comment statement. `text` is everything after `#`.
    #[must_use]
    pub fn comment(text: impl Into<String>) -> Self {
        Self {
            comment: Some(text.into()),
            ..Self::new(COMMENT)
        }
    }

    /// Add an argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Add several arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    /// Set the child block.
    #[must_use]
    pub fn block(mut self, children: Vec<Self>) -> Self {
        self.block = Some(children);
        self
    }

    /// Set the source line.
    #[must_use]
    pub const fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.directive == COMMENT
    }

    /// The comment text, or an empty string for non-comments.
    #[must_use]
    pub fn comment_text(&self) -> &str {
        self.comment.as_deref().unwrap_or_default()
    }
}

/// Outcome of parsing one file or a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Ok,
    Failed,
}

impl Status {
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// An error recorded against a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    #[serde(rename = "error")]
    pub message: String,
    #[serde(rename = "file", default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    pub line: Option<usize>,
    /// Extra diagnostics about the originating error, when requested.
    #[serde(rename = "callback", default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} in {}:{line}", self.message, self.path),
            None => write!(f, "{} in {}", self.message, self.path),
        }
    }
}

impl std::error::Error for FileError {}

/// One physical file's parse result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFile {
    #[serde(rename = "file")]
    pub path: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub errors: Vec<FileError>,
    #[serde(default)]
    pub parsed: Vec<Statement>,
}

impl ParsedFile {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: Status::Ok,
            errors: Vec::new(),
            parsed: Vec::new(),
        }
    }

    /// Record an error and mark the file failed.
    pub fn push_error(&mut self, error: FileError) {
        self.status = Status::Failed;
        self.errors.push(error);
    }
}

/// Result of one top-level parse run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub errors: Vec<FileError>,
    pub config: Vec<ParsedFile>,
}

impl Response {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// The statements of the first (main) file.
    #[must_use]
    pub fn main(&self) -> &[Statement] {
        self.config.first().map_or(&[], |f| f.parsed.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fluent_statement() {
        let stmt = Statement::new("server").block(vec![Statement::new("listen").arg("80")]);
        assert_eq!(stmt.block.as_ref().map(Vec::len), Some(1));
        assert!(stmt.args.is_empty());
    }

    #[test]
    fn comment_statement() {
        let c = Statement::comment(" hi").at_line(3);
        assert!(c.is_comment());
        assert_eq!(c.comment_text(), " hi");
        assert_eq!(c.line, 3);
    }

    #[test]
    fn json_shape() {
        let stmt = Statement::new("listen").arg("80").at_line(2);
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"directive": "listen", "line": 2, "args": ["80"]})
        );
    }

    #[test]
    fn hand_built_json_defaults() {
        let stmt: Statement = serde_json::from_str(r#"{"directive": "daemon"}"#).unwrap();
        assert_eq!(stmt, Statement::new("daemon"));
    }

    #[test]
    fn file_error_display() {
        let e = FileError {
            message: "unexpected \"}\"".to_string(),
            path: "nginx.conf".to_string(),
            line: Some(4),
            detail: None,
        };
        assert_eq!(e.to_string(), "unexpected \"}\" in nginx.conf:4");
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Failed).unwrap(), "\"failed\"");
    }
}
