//! Parse-then-build pipelines for reformatting whole files.
//!
//! [`format`] keeps comments and re-indents; [`minify`] drops
//! comments and all optional whitespace. Both only need the file to
//! be syntactically valid: directive checks are off and includes are
//! not followed.

use std::fs;

use crate::Error;
use crate::ast::{Response, Statement};
use crate::builder::{BuildOptions, Builder};
use crate::ext::Extensions;
use crate::lexer::Lexer;
use crate::parser::{ParseOptions, Parser, STRING_SOURCE};
use crate::token::Token;

fn format_options() -> ParseOptions {
    ParseOptions::new()
        .comments(true)
        .single(true)
        .check_ctx(false)
        .check_args(false)
}

fn minify_options() -> ParseOptions {
    ParseOptions::new()
        .catch_errors(false)
        .single(true)
        .check_ctx(false)
        .check_args(false)
}

/// The main file's statements, or the first error recorded.
fn main_tree(response: Response) -> Result<Vec<Statement>, Error> {
    let Response { errors, config, .. } = response;
    if let Some(err) = errors.into_iter().next() {
        return Err(Error::Config(err));
    }
    Ok(config
        .into_iter()
        .next()
        .map(|file| file.parsed)
        .unwrap_or_default())
}

/// Format, minify and lex pipelines sharing one extension registry.
///
/// The free functions in this module run with no extensions; use this
/// when the input may hold extension syntax such as Lua blocks.
pub struct Formatter<'a> {
    options: BuildOptions,
    extensions: &'a Extensions,
}

impl<'a> Formatter<'a> {
    #[must_use]
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            extensions: Extensions::none(),
        }
    }

    #[must_use]
    pub fn extensions(mut self, extensions: &'a Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    fn parser(&self, options: ParseOptions) -> Parser<'a> {
        Parser::new(options).extensions(self.extensions)
    }

    fn builder(&self) -> Builder<'a> {
        Builder::new(self.options).extensions(self.extensions)
    }

    /// Reformat the file at `path`.
    pub fn format(&self, path: &str) -> Result<String, Error> {
        let tree = main_tree(self.parser(format_options()).parse(path))?;
        Ok(self.builder().build(&tree))
    }

    /// Reformat configuration text.
    pub fn format_str(&self, input: &str) -> Result<String, Error> {
        let response = self
            .parser(format_options())
            .parse_source(STRING_SOURCE, input);
        Ok(self.builder().build(&main_tree(response)?))
    }

    /// Minify the file at `path`.
    pub fn minify(&self, path: &str) -> Result<String, Error> {
        let tree = main_tree(self.parser(minify_options()).parse(path))?;
        Ok(self.builder().minify(&tree))
    }

    /// Minify configuration text.
    pub fn minify_str(&self, input: &str) -> Result<String, Error> {
        let response = self
            .parser(minify_options())
            .parse_source(STRING_SOURCE, input);
        Ok(self.builder().minify(&main_tree(response)?))
    }

    /// Read and tokenize the file at `path`.
    pub fn lex(&self, path: &str) -> Result<Vec<Token>, Error> {
        let text = fs::read_to_string(path)?;
        let tokens = Lexer::with_extensions(&text, self.extensions).collect::<Result<_, _>>()?;
        Ok(tokens)
    }
}

/// Reformat the file at `path`.
pub fn format(path: &str, options: &BuildOptions) -> Result<String, Error> {
    Formatter::new(*options).format(path)
}

/// Reformat configuration text.
pub fn format_str(input: &str, options: &BuildOptions) -> Result<String, Error> {
    Formatter::new(*options).format_str(input)
}

/// Minify the file at `path`.
pub fn minify(path: &str) -> Result<String, Error> {
    Formatter::new(BuildOptions::default()).minify(path)
}

/// Minify configuration text.
pub fn minify_str(input: &str) -> Result<String, Error> {
    Formatter::new(BuildOptions::default()).minify_str(input)
}

/// Read and tokenize the file at `path`.
pub fn lex(path: &str) -> Result<Vec<Token>, Error> {
    Formatter::new(BuildOptions::default()).lex(path)
}
