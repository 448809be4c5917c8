use std::collections::HashMap;
use std::io;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::analyzer::{Analyzer, DirectiveError, DirectiveTable};
use crate::ast::{FileError, ParsedFile, Response, Statement, Status};
use crate::ext::Extensions;
use crate::lexer::{LexError, LexErrorKind, Lexer};
use crate::loader::{ConfigLoader, FsLoader, has_magic, resolve_include};
use crate::token::Token;

/// Path recorded for sources parsed with [`parse_str`].
pub const STRING_SOURCE: &str = "<string>";

const EXPECT_CLOSE: &str = "\"}\"";
const EXPECT_END: &str = "\";\" or \"}\"";

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// The file could not be tokenized.
    #[error("{0}")]
    Lex(LexErrorKind),
    /// A delimiter where none is allowed.
    #[error("unexpected \"{token}\"")]
    Unexpected { token: String },
    /// Input ended inside a statement or block.
    #[error("unexpected end of file, expecting {expected}")]
    UnexpectedEof { expected: &'static str },
    /// A statement rejected by the directive table or an extension.
    #[error("{0}")]
    Directive(DirectiveError),
    /// An include target or the main file could not be read.
    #[error("open() \"{path}\" failed ({reason})")]
    Include { path: String, reason: String },
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: Option<usize>,
}

impl ParseError {
    const fn new(kind: ParseErrorKind, line: usize) -> Self {
        Self {
            kind,
            line: Some(line),
        }
    }

    fn unexpected(token: &Token) -> Self {
        Self::new(
            ParseErrorKind::Unexpected {
                token: token.text.clone(),
            },
            token.line,
        )
    }

    fn include(path: &str, err: &io::Error, line: Option<usize>) -> Self {
        Self {
            kind: ParseErrorKind::Include {
                path: path.to_string(),
                reason: err.to_string(),
            },
            line,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self::new(ParseErrorKind::Lex(err.kind), err.line)
    }
}

/// Options controlling a parse run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ParseOptions {
    /// Keep parsing after recoverable errors.
    pub catch_errors: bool,
    /// Directives exempt from validation.
    pub ignore: Vec<String>,
    /// Do not follow `include` directives.
    pub single: bool,
    /// Keep comments as statements.
    pub comments: bool,
    /// Reject directives missing from the table.
    pub strict: bool,
    /// Splice included files into one tree.
    pub combine: bool,
    pub check_ctx: bool,
    pub check_args: bool,
    /// Attach a debug rendering of the originating error to each
    /// response-level error.
    pub capture_detail: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            catch_errors: true,
            ignore: Vec::new(),
            single: false,
            comments: false,
            strict: false,
            combine: false,
            check_ctx: true,
            check_args: true,
            capture_detail: false,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn catch_errors(mut self, on: bool) -> Self {
        self.catch_errors = on;
        self
    }

    /// Exempt `directives` from validation.
    #[must_use]
    pub fn ignore<I, S>(mut self, directives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(directives.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub const fn single(mut self, on: bool) -> Self {
        self.single = on;
        self
    }

    #[must_use]
    pub const fn comments(mut self, on: bool) -> Self {
        self.comments = on;
        self
    }

    #[must_use]
    pub const fn strict(mut self, on: bool) -> Self {
        self.strict = on;
        self
    }

    #[must_use]
    pub const fn combine(mut self, on: bool) -> Self {
        self.combine = on;
        self
    }

    #[must_use]
    pub const fn check_ctx(mut self, on: bool) -> Self {
        self.check_ctx = on;
        self
    }

    #[must_use]
    pub const fn check_args(mut self, on: bool) -> Self {
        self.check_args = on;
        self
    }

    #[must_use]
    pub const fn capture_detail(mut self, on: bool) -> Self {
        self.capture_detail = on;
        self
    }

    fn ignores(&self, directive: &str) -> bool {
        self.ignore.iter().any(|d| d == directive)
    }
}

/// Parse the file at `path` from disk, following includes.
#[must_use]
pub fn parse(path: &str, options: &ParseOptions) -> Response {
    Parser::new(options.clone()).parse(path)
}

/// Parse configuration text held in memory. Includes are left as
/// ordinary directives.
#[must_use]
pub fn parse_str(input: &str, options: &ParseOptions) -> Response {
    Parser::new(options.clone().single(true)).parse_source(STRING_SOURCE, input)
}

static FS_LOADER: FsLoader = FsLoader;

/// Parses configuration files into a [`Response`].
///
/// The loader, directive table and extension registry are borrowed
/// for the life of the parser; by default they are the filesystem,
/// [`DirectiveTable::builtin`] and no extensions.
pub struct Parser<'a> {
    options: ParseOptions,
    loader: &'a dyn ConfigLoader,
    table: &'a DirectiveTable,
    extensions: &'a Extensions,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            loader: &FS_LOADER,
            table: DirectiveTable::builtin(),
            extensions: Extensions::none(),
        }
    }

    /// Read files through `loader` instead of the filesystem.
    #[must_use]
    pub fn loader(mut self, loader: &'a dyn ConfigLoader) -> Self {
        self.loader = loader;
        self
    }

    #[must_use]
    pub fn table(mut self, table: &'a DirectiveTable) -> Self {
        self.table = table;
        self
    }

    #[must_use]
    pub fn extensions(mut self, extensions: &'a Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    #[must_use]
    pub const fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Read and parse the file at `path`.
    #[must_use]
    pub fn parse(&self, path: &str) -> Response {
        match self.loader.read(path) {
            Ok(text) => self.parse_source(path, &text),
            Err(err) => {
                debug!(path, %err, "cannot read main file");
                let mut run = Run::new(self);
                let index = run.reserve(path);
                run.record(index, ParseError::include(path, &err, None));
                run.finish()
            }
        }
    }

    /// Parse `text` as the main file at `path`. Includes are resolved
    /// relative to `path` through the loader.
    #[must_use]
    pub fn parse_source(&self, path: &str, text: &str) -> Response {
        let mut run = Run::new(self);
        let index = run.reserve(path);
        run.parse_file(index, text, &[]);
        run.finish()
    }
}

/// Token source for one file, remembering the last line seen.
struct Tokens<'s> {
    lexer: Lexer<'s>,
    line: usize,
}

impl<'s> Tokens<'s> {
    const fn new(lexer: Lexer<'s>) -> Self {
        Self { lexer, line: 1 }
    }

    fn advance(&mut self) -> Result<Option<Token>, ParseError> {
        match self.lexer.next() {
            Some(Ok(token)) => {
                self.line = token.line;
                Ok(Some(token))
            }
            Some(Err(err)) => Err(err.into()),
            None => Ok(None),
        }
    }

    fn eof(&self, expected: &'static str) -> ParseError {
        ParseError::new(ParseErrorKind::UnexpectedEof { expected }, self.line)
    }

    /// Consume tokens up to the `}` matching an already consumed `{`.
    fn skip_block(&mut self) -> Result<(), ParseError> {
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.advance()?.ok_or_else(|| self.eof(EXPECT_CLOSE))?;
            if token.is("{") {
                depth += 1;
            } else if token.is("}") {
                depth -= 1;
            }
        }
        Ok(())
    }
}

/// State of one top-level parse: every file visited so far, in the
/// order they were first reached.
struct Run<'r, 'a> {
    parser: &'r Parser<'a>,
    analyzer: Analyzer<'a>,
    files: Vec<ParsedFile>,
    errors: Vec<Vec<FileError>>,
    included: HashMap<String, usize>,
}

impl<'r, 'a> Run<'r, 'a> {
    fn new(parser: &'r Parser<'a>) -> Self {
        let mut analyzer = Analyzer::new(parser.table).with_extensions(parser.extensions);
        analyzer.strict = parser.options.strict;
        analyzer.check_ctx = parser.options.check_ctx;
        analyzer.check_args = parser.options.check_args;
        Self {
            parser,
            analyzer,
            files: Vec::new(),
            errors: Vec::new(),
            included: HashMap::new(),
        }
    }

    /// Claim the next config index for `path`.
    fn reserve(&mut self, path: &str) -> usize {
        let index = self.files.len();
        self.files.push(ParsedFile::new(path));
        self.errors.push(Vec::new());
        self.included.insert(path.to_string(), index);
        index
    }

    fn record(&mut self, file: usize, err: ParseError) {
        let error = FileError {
            message: err.kind.to_string(),
            path: self.files[file].path.clone(),
            line: err.line,
            detail: None,
        };
        let top = FileError {
            detail: self.parser.options.capture_detail.then(|| format!("{err:?}")),
            ..error.clone()
        };
        self.files[file].push_error(error);
        self.errors[file].push(top);
    }

    /// Record `err` and carry on, or hand it back to abort the file.
    fn recover(&mut self, file: usize, err: ParseError) -> Result<(), ParseError> {
        if !self.parser.options.catch_errors {
            return Err(err);
        }
        trace!(path = %self.files[file].path, line = ?err.line, error = %err, "recovered");
        self.record(file, err);
        Ok(())
    }

    fn parse_file(&mut self, file: usize, text: &str, ctx: &[String]) {
        let extensions: &'a Extensions = self.parser.extensions;
        debug!(path = %self.files[file].path, index = file, "parsing file");

        let mut tokens = Tokens::new(Lexer::with_extensions(text, extensions));
        let mut parsed = Vec::new();
        let result = self.parse_block(file, &mut tokens, ctx, false, &mut parsed);
        self.files[file].parsed = parsed;
        if let Err(err) = result {
            self.record(file, err);
        }

        debug!(
            path = %self.files[file].path,
            errors = self.files[file].errors.len(),
            "finished file"
        );
    }

    fn parse_block(
        &mut self,
        file: usize,
        tokens: &mut Tokens<'_>,
        ctx: &[String],
        nested: bool,
        out: &mut Vec<Statement>,
    ) -> Result<(), ParseError> {
        let keep_comments = self.parser.options.comments;

        'statements: loop {
            let Some(token) = tokens.advance()? else {
                if nested {
                    return Err(tokens.eof(EXPECT_CLOSE));
                }
                return Ok(());
            };

            if token.is("}") {
                if nested {
                    return Ok(());
                }
                self.recover(file, ParseError::unexpected(&token))?;
                continue;
            }
            if token.is_comment() {
                if keep_comments {
                    out.push(comment_statement(&token.text, token.line));
                }
                continue;
            }
            if token.is(";") || token.is("{") {
                self.recover(file, ParseError::unexpected(&token))?;
                if token.is("{") {
                    tokens.skip_block()?;
                }
                continue;
            }

            let mut stmt = Statement::new(token.text).at_line(token.line);
            let mut comments = Vec::new();
            let opens_block = loop {
                let arg = tokens.advance()?.ok_or_else(|| tokens.eof(EXPECT_END))?;
                if arg.is(";") {
                    break false;
                }
                if arg.is("{") {
                    break true;
                }
                if arg.is("}") {
                    self.recover(file, ParseError::unexpected(&arg))?;
                    if nested {
                        return Ok(());
                    }
                    continue 'statements;
                }
                if arg.is_comment() {
                    if keep_comments {
                        comments.push(comment_statement(&arg.text, stmt.line));
                    }
                    continue;
                }
                stmt.args.push(arg.text);
            };

            if stmt.directive == "if" {
                prepare_if_args(&mut stmt.args);
            }

            if let Err(err) = self.validate(&mut stmt, opens_block, ctx) {
                let line = stmt.line;
                self.recover(file, ParseError::new(ParseErrorKind::Directive(err), line))?;
                if opens_block {
                    tokens.skip_block()?;
                }
                continue;
            }

            if opens_block {
                let inner = enter_block_ctx(ctx, &stmt.directive);
                let mut children = Vec::new();
                let result = self.parse_block(file, tokens, &inner, true, &mut children);
                stmt.block = Some(children);
                out.push(stmt);
                out.append(&mut comments);
                result?;
                continue;
            }

            if stmt.directive == "include" && !self.parser.options.single {
                stmt.includes = Some(self.include(file, &stmt, ctx)?);
            }
            out.push(stmt);
            out.append(&mut comments);
        }
    }

    fn validate(
        &self,
        stmt: &mut Statement,
        has_block: bool,
        ctx: &[String],
    ) -> Result<(), DirectiveError> {
        if let Some(extension) = self.parser.extensions.get(&stmt.directive) {
            extension.parse(stmt, ctx)?;
        }
        if self.parser.options.ignores(&stmt.directive) {
            return Ok(());
        }
        self.analyzer
            .analyze(&stmt.directive, &stmt.args, has_block, ctx)
    }

    /// Resolve and parse the targets of an `include` statement,
    /// returning their config indices.
    fn include(
        &mut self,
        file: usize,
        stmt: &Statement,
        ctx: &[String],
    ) -> Result<Vec<usize>, ParseError> {
        let Some(target) = stmt.args.first() else {
            return Ok(Vec::new());
        };
        let loader = self.parser.loader;
        let pattern = resolve_include(&self.files[file].path, target);

        let paths = if has_magic(&pattern) {
            match loader.glob(&pattern) {
                Ok(paths) => paths,
                Err(err) => {
                    self.recover(file, ParseError::include(&pattern, &err, Some(stmt.line)))?;
                    return Ok(Vec::new());
                }
            }
        } else {
            vec![pattern]
        };

        let mut indices = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(&index) = self.included.get(&path) {
                trace!(%path, index, "already included");
                indices.push(index);
                continue;
            }
            let text = match loader.read(&path) {
                Ok(text) => text,
                Err(err) => {
                    self.recover(file, ParseError::include(&path, &err, Some(stmt.line)))?;
                    continue;
                }
            };
            let index = self.reserve(&path);
            debug!(%path, index, "following include");
            self.parse_file(index, &text, ctx);
            indices.push(index);
        }
        Ok(indices)
    }

    fn finish(self) -> Response {
        let errors: Vec<FileError> = self.errors.into_iter().flatten().collect();
        let config = if self.parser.options.combine {
            combine(&self.files).into_iter().collect()
        } else {
            self.files
        };
        let failed = !errors.is_empty() || config.iter().any(|f| !f.status.is_ok());
        Response {
            status: if failed { Status::Failed } else { Status::Ok },
            errors,
            config,
        }
    }
}

fn comment_statement(text: &str, line: usize) -> Statement {
    Statement::comment(text.strip_prefix('#').unwrap_or(text)).at_line(line)
}

/// Context stack for the body of a `directive` block opened in `ctx`.
/// Locations nested anywhere under `http` share one context.
fn enter_block_ctx(ctx: &[String], directive: &str) -> Vec<String> {
    if directive == "location" && ctx.first().is_some_and(|c| c == "http") {
        return vec!["http".to_string(), "location".to_string()];
    }
    let mut inner = ctx.to_vec();
    inner.push(directive.to_string());
    inner
}

/// Strip the parentheses around an `if` condition.
fn prepare_if_args(args: &mut Vec<String>) {
    let wrapped = args.first().is_some_and(|a| a.starts_with('('))
        && args.last().is_some_and(|a| a.ends_with(')'));
    if !wrapped {
        return;
    }
    if let Some(first) = args.first_mut() {
        first.replace_range(..1, "");
    }
    let last = args
        .last()
        .and_then(|a| a.strip_suffix(')'))
        .map(ToString::to_string);
    if let (Some(stripped), Some(slot)) = (last, args.last_mut()) {
        *slot = stripped;
    }
    if args.first().is_some_and(String::is_empty) {
        args.remove(0);
    }
    if args.last().is_some_and(String::is_empty) {
        args.pop();
    }
}

/// Merge every file into the first, splicing included statements in
/// place of their `include` and tagging each with its origin.
fn combine(files: &[ParsedFile]) -> Option<ParsedFile> {
    let main = files.first()?;
    let mut combined = ParsedFile::new(main.path.clone());
    for file in files {
        for error in &file.errors {
            combined.push_error(error.clone());
        }
    }
    combined.parsed = splice_file(files, 0, &mut Vec::new());
    Some(combined)
}

fn splice_file(files: &[ParsedFile], index: usize, active: &mut Vec<usize>) -> Vec<Statement> {
    let Some(file) = files.get(index) else {
        return Vec::new();
    };
    active.push(index);
    let mut out = Vec::with_capacity(file.parsed.len());
    for stmt in &file.parsed {
        splice_statement(files, &file.path, stmt, active, &mut out);
    }
    active.pop();
    out
}

fn splice_statement(
    files: &[ParsedFile],
    path: &str,
    stmt: &Statement,
    active: &mut Vec<usize>,
    out: &mut Vec<Statement>,
) {
    if let Some(includes) = &stmt.includes {
        for &index in includes {
            if !active.contains(&index) {
                out.extend(splice_file(files, index, active));
            }
        }
        return;
    }

    let block = stmt.block.as_ref().map(|children| {
        let mut spliced = Vec::with_capacity(children.len());
        for child in children {
            splice_statement(files, path, child, active, &mut spliced);
        }
        spliced
    });
    out.push(Statement {
        directive: stmt.directive.clone(),
        line: stmt.line,
        args: stmt.args.clone(),
        includes: None,
        block,
        comment: stmt.comment.clone(),
        file: Some(path.to_string()),
    });
}
