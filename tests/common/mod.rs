#![allow(dead_code)]

use nginx_conf_rs::{BuildOptions, ParseOptions, Response, Statement, build, parse_str};
use pretty_assertions::assert_eq;

/// Options for syntax-only parsing that keeps comments.
pub fn syntax_only() -> ParseOptions {
    ParseOptions::new()
        .comments(true)
        .check_ctx(false)
        .check_args(false)
}

/// Parse with default options and assert there were no errors.
pub fn parse_ok(input: &str) -> Vec<Statement> {
    let resp = parse_str(input, &ParseOptions::default());
    assert!(
        resp.is_ok(),
        "unexpected errors: {:?}\n--- input ---\n{input}",
        resp.errors
    );
    main_tree(resp)
}

pub fn main_tree(resp: Response) -> Vec<Statement> {
    resp.config
        .into_iter()
        .next()
        .map(|f| f.parsed)
        .unwrap_or_default()
}

/// Error messages of a response, in order.
pub fn messages(resp: &Response) -> Vec<String> {
    resp.errors.iter().map(|e| e.message.clone()).collect()
}

/// Copy of `tree` with line numbers and origin files cleared.
pub fn strip_lines(tree: &[Statement]) -> Vec<Statement> {
    tree.iter()
        .map(|stmt| Statement {
            line: 0,
            file: None,
            block: stmt.block.as_deref().map(strip_lines),
            ..stmt.clone()
        })
        .collect()
}

/// Parse `input`, build it with default options, and assert the
/// output is identical.
pub fn roundtrip(input: &str) {
    let resp = parse_str(input, &syntax_only());
    assert!(resp.is_ok(), "parse failed: {:?}", resp.errors);
    let output = build(resp.main(), &BuildOptions::default());
    assert_eq!(
        output, input,
        "round-trip mismatch:\n--- expected ---\n{input}\n--- got ---\n{output}"
    );
}

/// Build `tree`, parse it back, and assert the trees match apart
/// from line numbers.
pub fn assert_tree_roundtrip(tree: &[Statement]) {
    let built = build(tree, &BuildOptions::default());
    let resp = parse_str(&built, &syntax_only());
    assert!(
        resp.is_ok(),
        "failed to re-parse built output: {:?}\n--- built ---\n{built}",
        resp.errors
    );
    assert_eq!(
        strip_lines(tree),
        strip_lines(resp.main()),
        "tree mismatch\n--- built ---\n{built}"
    );
}
