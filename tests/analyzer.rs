//! Directive placement and argument validation through the parser.

mod common;

use common::{main_tree, messages, parse_ok};
use nginx_conf_rs::{
    Arity, Context, DirectiveRule, DirectiveTable, ParseOptions, Parser, analyzer::Contexts,
    parse_str,
};

fn errors(input: &str) -> Vec<String> {
    messages(&parse_str(input, &ParseOptions::default()))
}

// -----------------------------------------------------------
// Context checks.
// -----------------------------------------------------------

#[test]
fn listen_rejected_at_top_level() {
    assert_eq!(errors("listen 80;"), ["\"listen\" directive is not allowed here"]);
}

#[test]
fn listen_accepted_inside_server() {
    let tree = parse_ok("http {\n    server {\n        listen 80;\n    }\n}\n");
    let server = &tree[0].block.as_ref().unwrap()[0];
    assert_eq!(server.directive, "server");
    assert_eq!(server.block.as_ref().unwrap()[0].args, ["80"]);
}

#[test]
fn server_in_upstream_is_a_leaf() {
    parse_ok("http {\n    upstream app {\n        server 10.0.0.1:8080 weight=3;\n    }\n}\n");
}

#[test]
fn server_block_in_upstream_is_rejected() {
    assert_eq!(
        errors("http { upstream app { server { } } }"),
        ["directive \"server\" is not terminated by \";\""]
    );
}

#[test]
fn nested_locations_share_context() {
    parse_ok(
        "http { server { location / { location /api { proxy_pass http://app; } } } }",
    );
}

#[test]
fn if_inside_location() {
    let tree = parse_ok(
        "http { server { location / { if ($request_method = POST) { return 405; } } } }",
    );
    let server = &tree[0].block.as_ref().unwrap()[0];
    let location = &server.block.as_ref().unwrap()[0];
    let if_stmt = &location.block.as_ref().unwrap()[0];
    assert_eq!(if_stmt.args, ["$request_method", "=", "POST"]);
}

#[test]
fn limit_except_accepts_location_directives() {
    parse_ok("http { server { location / { limit_except GET { deny all; } } } }");
}

#[test]
fn unknown_contexts_are_not_checked() {
    parse_ok("http { map $uri $dest { default 0; listen 80; } }");
}

#[test]
fn check_ctx_off() {
    let resp = parse_str("listen 80;", &ParseOptions::new().check_ctx(false));
    assert!(resp.is_ok());
}

// -----------------------------------------------------------
// Argument checks.
// -----------------------------------------------------------

#[test]
fn take1_rejects_zero_and_two() {
    let expected = "invalid number of arguments in \"worker_processes\" directive";
    assert_eq!(errors("worker_processes;"), [expected]);
    assert_eq!(errors("worker_processes 2 4;"), [expected]);
    assert!(errors("worker_processes 2;").is_empty());
}

#[test]
fn flag_must_be_on_or_off() {
    assert_eq!(
        errors("daemon maybe;"),
        ["invalid value \"maybe\" in \"daemon\" directive, it must be \"on\" or \"off\""]
    );
    assert!(errors("daemon OFF;").is_empty());
}

#[test]
fn block_directive_without_block() {
    assert_eq!(errors("events;"), ["directive \"events\" has no opening \"{\""]);
}

#[test]
fn check_args_off() {
    let resp = parse_str("worker_processes;", &ParseOptions::new().check_args(false));
    assert!(resp.is_ok());
}

// -----------------------------------------------------------
// Unknown and ignored directives.
// -----------------------------------------------------------

#[test]
fn unknown_directive_accepted_by_default() {
    let tree = parse_ok("frobnicate a b { nested x; }");
    assert_eq!(tree[0].directive, "frobnicate");
    assert_eq!(tree[0].block.as_ref().unwrap()[0].directive, "nested");
}

#[test]
fn unknown_directive_rejected_when_strict() {
    let resp = parse_str("frobnicate;", &ParseOptions::new().strict(true));
    assert_eq!(messages(&resp), ["unknown directive \"frobnicate\""]);
}

#[test]
fn ignored_directives_skip_validation_but_stay() {
    let opts = ParseOptions::new().strict(true).ignore(["listen", "frobnicate"]);
    let resp = parse_str("listen 80;\nfrobnicate;", &opts);
    assert!(resp.is_ok());
    let tree = main_tree(resp);
    assert_eq!(tree.len(), 2);
}

// -----------------------------------------------------------
// Custom tables.
// -----------------------------------------------------------

#[test]
fn custom_table() {
    let mut table = DirectiveTable::new();
    table.insert(
        "greeting",
        [DirectiveRule::leaf(Contexts::of(&[Context::Main]), Arity::TAKE2)],
    );
    let parser = Parser::new(ParseOptions::new().strict(true)).table(&table);

    assert!(parser.parse_source("t.conf", "greeting hello world;").is_ok());

    let resp = parser.parse_source("t.conf", "greeting hello;\nlisten 80;");
    assert_eq!(
        messages(&resp),
        [
            "invalid number of arguments in \"greeting\" directive",
            "unknown directive \"listen\"",
        ]
    );
    assert_eq!(resp.errors[1].line, Some(2));
    assert_eq!(resp.errors[1].path, "t.conf");
}
