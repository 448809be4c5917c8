//! nginx-style configuration lexer, parser, validator, and builder.
//!
//! Parses block-structured server configuration (directives,
//! arguments, `{ ... }` blocks, comments and `include`s) into a typed
//! statement tree, checks each directive's placement and arguments
//! against a directive table, and builds the tree back into text such
//! that parse, build, parse is idempotent.
//!
//! # Quick start
//!
//! ## Parse and rebuild
//!
//! ```
//! use nginx_conf_rs::{BuildOptions, ParseOptions, build, parse_str};
//!
//! let resp = parse_str("events {\n    worker_connections 512;\n}\n", &ParseOptions::default());
//! assert!(resp.is_ok());
//! let text = build(resp.main(), &BuildOptions::default());
//! assert_eq!(text, "events {\n    worker_connections 512;\n}\n");
//! ```
//!
//! ## Build a tree programmatically
//!
//! ```
//! use nginx_conf_rs::{BuildOptions, Statement, build};
//!
//! let tree = vec![Statement::new("http").block(vec![
//!     Statement::new("server").block(vec![
//!         Statement::new("listen").arg("80"),
//!         Statement::new("return").arg("200").arg("hello world"),
//!     ]),
//! ])];
//!
//! let text = build(&tree, &BuildOptions::new().indent(2));
//! assert!(text.contains("return 200 \"hello world\";"));
//! ```
//!
//! ## Validation errors
//!
//! ```
//! use nginx_conf_rs::{ParseOptions, parse_str};
//!
//! let resp = parse_str("listen 80;", &ParseOptions::default());
//! assert!(!resp.is_ok());
//! assert_eq!(resp.errors[0].message, "\"listen\" directive is not allowed here");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod analyzer;
pub mod ast;
pub mod builder;
pub mod cursor;
pub mod directives;
pub mod ext;
pub mod formatter;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod quoting;
pub mod token;

pub use analyzer::{Analyzer, Arity, BlockRule, Context, DirectiveError, DirectiveRule, DirectiveTable};
pub use ast::{FileError, ParsedFile, Response, Statement, Status};
pub use builder::{BuildOptions, Builder, build};
pub use ext::{Extension, Extensions};
pub use formatter::{Formatter, format, format_str, minify, minify_str};
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize};
pub use loader::{ConfigLoader, FsLoader, MemoryLoader};
pub use parser::{ParseError, ParseErrorKind, ParseOptions, Parser, parse, parse_str};
pub use quoting::{enquote, needs_quoting};
pub use token::Token;

/// Error type for the whole-file convenience pipelines.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// The first error recorded while parsing.
    #[error("{0}")]
    Config(#[from] FileError),
}
