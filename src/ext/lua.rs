//! OpenResty `*_by_lua_block` directives.
//!
//! The body of a Lua block is Lua source, not configuration syntax,
//! so it is captured as a single quoted argument and written back
//! verbatim between braces.

use crate::analyzer::{Arity, Context as C, Contexts, DirectiveRule};
use crate::ast::Statement;
use crate::cursor::Cursor;
use crate::ext::Extension;
use crate::lexer::{LexError, LexErrorKind};
use crate::quoting::enquote;
use crate::token::Token;

const SET_BY_LUA_BLOCK: &str = "set_by_lua_block";

const HTTP_MAIN: Contexts = Contexts::of(&[C::Http]);
const HTTP_MS: Contexts = Contexts::of(&[C::Http, C::HttpServer]);
const HTTP_UPS: Contexts = Contexts::of(&[C::HttpUpstream]);
const HTTP_LOC_LIF: Contexts = Contexts::of(&[C::HttpLocation, C::HttpLocationIf]);
const HTTP_MSL_LIF: Contexts =
    Contexts::of(&[C::Http, C::HttpServer, C::HttpLocation, C::HttpLocationIf]);
const HTTP_REWRITE: Contexts = Contexts::of(&[
    C::HttpServer,
    C::HttpServerIf,
    C::HttpLocation,
    C::HttpLocationIf,
]);

/// Lexes, validates, and builds Lua block directives.
#[derive(Debug, Clone, Copy, Default)]
pub struct LuaBlocks;

impl Extension for LuaBlocks {
    fn directives(&self) -> Vec<(&'static str, Vec<DirectiveRule>)> {
        let body = |contexts| vec![DirectiveRule::leaf(contexts, Arity::TAKE1)];
        vec![
            ("init_by_lua_block", body(HTTP_MAIN)),
            ("init_worker_by_lua_block", body(HTTP_MAIN)),
            ("exit_worker_by_lua_block", body(HTTP_MAIN)),
            ("ssl_certificate_by_lua_block", body(HTTP_MS)),
            ("ssl_session_fetch_by_lua_block", body(HTTP_MAIN)),
            ("ssl_session_store_by_lua_block", body(HTTP_MAIN)),
            ("rewrite_by_lua_block", body(HTTP_MSL_LIF)),
            ("access_by_lua_block", body(HTTP_MSL_LIF)),
            ("content_by_lua_block", body(HTTP_LOC_LIF)),
            ("header_filter_by_lua_block", body(HTTP_MSL_LIF)),
            ("body_filter_by_lua_block", body(HTTP_MSL_LIF)),
            ("log_by_lua_block", body(HTTP_MSL_LIF)),
            ("balancer_by_lua_block", body(HTTP_UPS)),
            (
                SET_BY_LUA_BLOCK,
                vec![DirectiveRule::leaf(HTTP_REWRITE, Arity::TAKE2)],
            ),
        ]
    }

    fn lex(&self, cursor: &mut Cursor<'_>, directive: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::with_capacity(3);

        if directive == SET_BY_LUA_BLOCK {
            cursor.skip_whitespace();
            let line = cursor.line();
            let mut variable = String::new();
            while let Some(c) = cursor.peek_char() {
                if c.is_whitespace() || c == '{' {
                    break;
                }
                variable.push(c);
                cursor.next_char();
            }
            tokens.push(Token::bare(variable, line));
        }

        cursor.skip_whitespace();
        let line = cursor.line();
        if !cursor.eat('{') {
            return Err(error("expected \"{\" to start Lua block", line));
        }

        let body = read_body(cursor, line)?;
        tokens.push(Token::quoted(body, line));
        tokens.push(Token::bare(";", cursor.line()));
        Ok(tokens)
    }

    fn build(&self, stmt: &Statement, _padding: &str, _indent: usize, _tabs: bool) -> Option<String> {
        let (body, leading) = stmt.args.split_last()?;
        let mut built = stmt.directive.clone();
        for arg in leading {
            built.push(' ');
            built.push_str(&enquote(arg));
        }
        built.push_str(" {");
        built.push_str(body);
        built.push('}');
        Some(built)
    }
}

fn error(message: &str, line: usize) -> LexError {
    LexError {
        kind: LexErrorKind::Extension(message.to_string()),
        line,
    }
}

/// Read up to the `}` matching an already consumed `{`. Braces inside
/// Lua strings and `--` comments do not count.
fn read_body(cursor: &mut Cursor<'_>, line: usize) -> Result<String, LexError> {
    let unterminated = || error("unexpected end of file in Lua block, expecting \"}\"", line);
    let mut body = String::new();
    let mut depth = 1usize;

    loop {
        let c = cursor.next_char().ok_or_else(unterminated)?;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(body);
                }
            }
            '"' | '\'' => {
                body.push(c);
                loop {
                    let s = cursor.next_char().ok_or_else(unterminated)?;
                    body.push(s);
                    if s == '\\' {
                        body.push(cursor.next_char().ok_or_else(unterminated)?);
                    } else if s == c {
                        break;
                    }
                }
                continue;
            }
            '-' if cursor.peek_char() == Some('-') => {
                body.push(c);
                while let Some(s) = cursor.peek_char() {
                    if s == '\n' {
                        break;
                    }
                    body.push(s);
                    cursor.next_char();
                }
                continue;
            }
            _ => {}
        }
        body.push(c);
    }
}
