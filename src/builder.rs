//! Serializes statement trees back into configuration text.
//!
//! [`build`] is the inverse of parsing: every directive and argument
//! goes through [`enquote`], comments whose line matches the previous
//! statement are kept on that statement's line, and blocks are
//! indented one level per depth.

use serde::{Deserialize, Serialize};

use crate::ast::Statement;
use crate::ext::Extensions;
use crate::quoting::enquote;

/// Banner prepended when [`BuildOptions::header`] is on.
pub const HEADER: &str = "# This config was built from JSON using nginx-conf-rs.\n\
                          # Edit the source tree rather than this file.\n\n";

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Spaces per indentation level when `tabs` is off.
    pub indent: usize,
    pub tabs: bool,
    /// Prepend [`HEADER`].
    pub header: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            tabs: false,
            header: false,
        }
    }
}

impl BuildOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn indent(mut self, width: usize) -> Self {
        self.indent = width;
        self
    }

    #[must_use]
    pub const fn tabs(mut self, on: bool) -> Self {
        self.tabs = on;
        self
    }

    #[must_use]
    pub const fn header(mut self, on: bool) -> Self {
        self.header = on;
        self
    }

    /// One level of indentation.
    #[must_use]
    pub fn padding(&self) -> String {
        if self.tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent)
        }
    }
}

/// Render `statements` with no extensions.
#[must_use]
pub fn build(statements: &[Statement], options: &BuildOptions) -> String {
    Builder::new(*options).build(statements)
}

/// Renders statement trees, delegating registered directives to
/// their extension.
#[derive(Debug, Clone, Copy)]
pub struct Builder<'a> {
    options: BuildOptions,
    extensions: &'a Extensions,
}

impl<'a> Builder<'a> {
    #[must_use]
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            extensions: Extensions::none(),
        }
    }

    #[must_use]
    pub const fn extensions(mut self, extensions: &'a Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Render `statements` as indented text ending in one newline.
    #[must_use]
    pub fn build(&self, statements: &[Statement]) -> String {
        let padding = self.options.padding();
        let mut body = String::new();
        self.build_block(&mut body, statements, &padding, 0, None);

        let mut out = String::with_capacity(body.len() + HEADER.len() + 1);
        if self.options.header {
            out.push_str(HEADER);
        }
        out.push_str(&body);
        out.push('\n');
        out
    }

    /// Render `statements` on as few bytes as the grammar allows.
    /// Comments are dropped.
    #[must_use]
    pub fn minify(&self, statements: &[Statement]) -> String {
        let padding = self.options.padding();
        let mut out = String::new();
        self.minify_block(&mut out, statements, &padding);
        out.push('\n');
        out
    }

    fn build_block(
        &self,
        out: &mut String,
        block: &[Statement],
        padding: &str,
        depth: usize,
        mut last_line: Option<usize>,
    ) {
        let margin = padding.repeat(depth);

        for stmt in block {
            // a comment runs to the end of its line, so nothing else
            // may follow it there
            if stmt.is_comment() && last_line.take() == Some(stmt.line) {
                out.push_str(" #");
                out.push_str(stmt.comment_text());
                continue;
            }

            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&margin);

            if stmt.is_comment() {
                out.push('#');
                out.push_str(stmt.comment_text());
            } else if let Some(built) = self.custom(stmt, padding) {
                out.push_str(&built);
            } else {
                push_head(out, stmt);
                match &stmt.block {
                    None => out.push(';'),
                    Some(children) => {
                        out.push_str(" {");
                        self.build_block(out, children, padding, depth + 1, Some(stmt.line));
                        out.push('\n');
                        out.push_str(&margin);
                        out.push('}');
                    }
                }
            }
            if !stmt.is_comment() {
                last_line = Some(stmt.line);
            }
        }
    }

    fn minify_block(&self, out: &mut String, block: &[Statement], padding: &str) {
        for stmt in block.iter().filter(|s| !s.is_comment()) {
            if let Some(built) = self.custom(stmt, padding) {
                out.push_str(&built);
                continue;
            }
            push_head(out, stmt);
            match &stmt.block {
                None => out.push(';'),
                Some(children) => {
                    out.push('{');
                    self.minify_block(out, children, padding);
                    out.push('}');
                }
            }
        }
    }

    fn custom(&self, stmt: &Statement, padding: &str) -> Option<String> {
        self.extensions.get(&stmt.directive)?.build(
            stmt,
            padding,
            self.options.indent,
            self.options.tabs,
        )
    }
}

/// Directive and arguments, without the terminator.
fn push_head(out: &mut String, stmt: &Statement) {
    if stmt.directive == "if" {
        out.push_str("if (");
        // `("a` would lex as one bare word
        let first = stmt.args.first().map(String::as_str).map(enquote);
        if first.is_some_and(|a| a.starts_with('"')) {
            out.push(' ');
        }
        push_args(out, &stmt.args);
        out.push(')');
        return;
    }
    out.push_str(&enquote(&stmt.directive));
    if !stmt.args.is_empty() {
        out.push(' ');
        push_args(out, &stmt.args);
    }
}

fn push_args(out: &mut String, args: &[String]) {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&enquote(arg));
    }
}
