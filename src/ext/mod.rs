//! Per-directive extensions to the lexer, parser, and builder.
//!
//! An [`Extension`] claims a set of directive names. Whenever one of
//! them appears in directive position, the lexer lets the extension
//! consume the raw text that follows, the parser passes the finished
//! statement through [`Extension::parse`], and the builder asks
//! [`Extension::build`] to render it.
//!
//! Extensions live in an [`Extensions`] value owned by the caller and
//! handed to the parser and builder, so registration never leaks
//! between independent runs.

pub mod lua;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::analyzer::{DirectiveError, DirectiveRule};
use crate::ast::Statement;
use crate::cursor::Cursor;
use crate::lexer::LexError;
use crate::token::Token;

/// Custom grammar for a group of directives.
pub trait Extension: Send + Sync {
    /// Directive names this extension handles, with their rules.
    fn directives(&self) -> Vec<(&'static str, Vec<DirectiveRule>)>;

    /// Lex the text following the directive name. `cursor` sits right
    /// after the name; whatever is left unconsumed is lexed normally.
    ///
    /// # Errors
    ///
    /// Returns `LexError` when the custom syntax is malformed.
    fn lex(&self, cursor: &mut Cursor<'_>, directive: &str) -> Result<Vec<Token>, LexError> {
        let _ = (cursor, directive);
        Ok(Vec::new())
    }

    /// Adjust a statement after its arguments are collected and
    /// before it is validated.
    ///
    /// # Errors
    ///
    /// Returns `DirectiveError` to reject the statement.
    fn parse(&self, stmt: &mut Statement, ctx: &[String]) -> Result<(), DirectiveError> {
        let _ = (stmt, ctx);
        Ok(())
    }

    /// Render a statement, or `None` to use the default rendering.
    /// `padding` is one level of indentation.
    fn build(&self, stmt: &Statement, padding: &str, indent: usize, tabs: bool) -> Option<String> {
        let _ = (stmt, padding, indent, tabs);
        None
    }
}

/// Registry of extensions keyed by directive name.
#[derive(Clone, Default)]
pub struct Extensions {
    handlers: HashMap<String, Arc<dyn Extension>>,
    rules: HashMap<String, Vec<DirectiveRule>>,
}

static NONE: LazyLock<Extensions> = LazyLock::new(Extensions::new);

impl Extensions {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A shared empty registry.
    #[must_use]
    pub fn none() -> &'static Self {
        &NONE
    }

    /// Register `extension` for every directive it claims. A later
    /// registration for the same name replaces the earlier one.
    pub fn register(&mut self, extension: impl Extension + 'static) -> &mut Self {
        let extension: Arc<dyn Extension> = Arc::new(extension);
        for (name, rules) in extension.directives() {
            self.handlers.insert(name.to_string(), Arc::clone(&extension));
            self.rules.insert(name.to_string(), rules);
        }
        self
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, extension: impl Extension + 'static) -> Self {
        self.register(extension);
        self
    }

    #[must_use]
    pub fn get(&self, directive: &str) -> Option<&dyn Extension> {
        self.handlers.get(directive).map(AsRef::as_ref)
    }

    /// Rules registered for `directive`.
    #[must_use]
    pub fn rules(&self, directive: &str) -> Option<&[DirectiveRule]> {
        self.rules.get(directive).map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("Extensions")
            .field("directives", &names)
            .finish()
    }
}
