//! Include resolution, combine mode, and the file loaders.

mod common;

use std::fs;

use common::{main_tree, messages};
use nginx_conf_rs::{MemoryLoader, ParseOptions, Parser, Response, Statement, Status, parse};
use pretty_assertions::assert_eq;

fn run(loader: &MemoryLoader, path: &str, options: ParseOptions) -> Response {
    Parser::new(options).loader(loader).parse(path)
}

fn paths(resp: &Response) -> Vec<&str> {
    resp.config.iter().map(|f| f.path.as_str()).collect()
}

fn scenario() -> MemoryLoader {
    MemoryLoader::new()
        .with("nginx.conf", "include other.conf;\n")
        .with("other.conf", "baz qux;\n")
}

// -----------------------------------------------------------
// Separate files.
// -----------------------------------------------------------

#[test]
fn include_becomes_second_file() {
    let resp = run(&scenario(), "nginx.conf", ParseOptions::default());
    assert!(resp.is_ok());
    assert_eq!(paths(&resp), ["nginx.conf", "other.conf"]);
    assert_eq!(resp.config[0].parsed[0].includes, Some(vec![1]));
    assert_eq!(
        resp.config[1].parsed,
        [Statement::new("baz").arg("qux").at_line(1)]
    );
}

#[test]
fn included_files_inherit_context() {
    let loader = MemoryLoader::new()
        .with("/etc/nginx/nginx.conf", "http {\n    include conf.d/*.conf;\n}\n")
        .with("/etc/nginx/conf.d/b.conf", "server { listen 81; }")
        .with("/etc/nginx/conf.d/a.conf", "server { listen 80; }");
    let resp = run(&loader, "/etc/nginx/nginx.conf", ParseOptions::default());
    assert!(resp.is_ok(), "{:?}", resp.errors);
    assert_eq!(
        paths(&resp),
        [
            "/etc/nginx/nginx.conf",
            "/etc/nginx/conf.d/a.conf",
            "/etc/nginx/conf.d/b.conf",
        ]
    );
    let include = &resp.config[0].parsed[0].block.as_ref().unwrap()[0];
    assert_eq!(include.includes, Some(vec![1, 2]));
}

#[test]
fn nested_include_resolves_against_including_file() {
    let loader = MemoryLoader::new()
        .with("/etc/nginx/nginx.conf", "include conf.d/a.conf;")
        .with("/etc/nginx/conf.d/a.conf", "include sites/x.conf;")
        .with("/etc/nginx/conf.d/sites/x.conf", "daemon off;");
    let resp = run(&loader, "/etc/nginx/nginx.conf", ParseOptions::default());
    assert!(resp.is_ok(), "{:?}", resp.errors);
    assert_eq!(resp.config[2].path, "/etc/nginx/conf.d/sites/x.conf");
}

#[test]
fn files_are_numbered_depth_first() {
    let loader = MemoryLoader::new()
        .with("main.conf", "include a.conf;\ninclude b.conf;")
        .with("a.conf", "include c.conf;")
        .with("b.conf", "daemon on;")
        .with("c.conf", "pid /run/nginx.pid;");
    let resp = run(&loader, "main.conf", ParseOptions::default());
    assert_eq!(paths(&resp), ["main.conf", "a.conf", "c.conf", "b.conf"]);
    assert_eq!(resp.config[0].parsed[1].includes, Some(vec![3]));
}

#[test]
fn repeated_include_is_parsed_once() {
    let loader = MemoryLoader::new()
        .with("main.conf", "include a.conf;\ninclude a.conf;")
        .with("a.conf", "daemon on;");
    let resp = run(&loader, "main.conf", ParseOptions::default());
    assert_eq!(resp.config.len(), 2);
    assert_eq!(resp.config[0].parsed[0].includes, Some(vec![1]));
    assert_eq!(resp.config[0].parsed[1].includes, Some(vec![1]));
}

#[test]
fn include_cycle_terminates() {
    let loader = MemoryLoader::new()
        .with("main.conf", "include a.conf;")
        .with("a.conf", "include main.conf;");
    let resp = run(&loader, "main.conf", ParseOptions::default());
    assert_eq!(resp.config.len(), 2);
    assert_eq!(resp.config[1].parsed[0].includes, Some(vec![0]));

    let combined = run(&loader, "main.conf", ParseOptions::new().combine(true));
    assert!(combined.config[0].parsed.is_empty());
}

#[test]
fn single_mode_skips_includes() {
    let resp = run(&scenario(), "nginx.conf", ParseOptions::new().single(true));
    assert_eq!(resp.config.len(), 1);
    assert_eq!(resp.config[0].parsed[0].includes, None);
}

// -----------------------------------------------------------
// Combine mode.
// -----------------------------------------------------------

#[test]
fn combine_splices_included_statements() {
    let resp = run(&scenario(), "nginx.conf", ParseOptions::new().combine(true));
    assert!(resp.is_ok());
    assert_eq!(resp.config.len(), 1);
    assert_eq!(resp.config[0].path, "nginx.conf");

    let mut expected = Statement::new("baz").arg("qux").at_line(1);
    expected.file = Some("other.conf".to_string());
    assert_eq!(main_tree(resp), [expected]);
}

#[test]
fn combine_tags_every_statement() {
    let loader = MemoryLoader::new()
        .with("main.conf", "events {\n}\nhttp {\n    include web.conf;\n}\n")
        .with("web.conf", "server {\n    listen 80;\n}\n");
    let resp = run(&loader, "main.conf", ParseOptions::new().combine(true));
    let tree = main_tree(resp);

    assert_eq!(tree[0].file.as_deref(), Some("main.conf"));
    let http = &tree[1];
    assert_eq!(http.file.as_deref(), Some("main.conf"));
    let server = &http.block.as_ref().unwrap()[0];
    assert_eq!(server.file.as_deref(), Some("web.conf"));
    assert_eq!(server.line, 1);
    let listen = &server.block.as_ref().unwrap()[0];
    assert_eq!(listen.file.as_deref(), Some("web.conf"));
    assert_eq!(listen.line, 2);
}

#[test]
fn combine_merges_errors() {
    let loader = MemoryLoader::new()
        .with("main.conf", "include bad.conf;")
        .with("bad.conf", "listen 80;");
    let resp = run(&loader, "main.conf", ParseOptions::new().combine(true));
    assert_eq!(resp.status, Status::Failed);
    assert_eq!(resp.config.len(), 1);
    assert_eq!(resp.config[0].status, Status::Failed);
    assert_eq!(resp.config[0].errors[0].path, "bad.conf");
}

// -----------------------------------------------------------
// Failures.
// -----------------------------------------------------------

#[test]
fn missing_include_is_an_error_at_its_line() {
    let loader = MemoryLoader::new().with("main.conf", "daemon on;\ninclude missing.conf;");
    let resp = run(&loader, "main.conf", ParseOptions::default());
    assert_eq!(
        messages(&resp),
        ["open() \"missing.conf\" failed (No such file or directory)"]
    );
    assert_eq!(resp.errors[0].path, "main.conf");
    assert_eq!(resp.errors[0].line, Some(2));
    assert_eq!(resp.config[0].parsed[1].includes, Some(Vec::new()));
}

#[test]
fn empty_glob_is_fine() {
    let loader = MemoryLoader::new().with("main.conf", "include conf.d/*.conf;");
    let resp = run(&loader, "main.conf", ParseOptions::default());
    assert!(resp.is_ok());
    assert_eq!(resp.config[0].parsed[0].includes, Some(Vec::new()));
}

#[test]
fn missing_main_file() {
    let resp = run(&MemoryLoader::new(), "nope.conf", ParseOptions::default());
    assert_eq!(resp.status, Status::Failed);
    assert_eq!(resp.config.len(), 1);
    assert_eq!(resp.errors[0].line, None);
    assert_eq!(
        resp.errors[0].message,
        "open() \"nope.conf\" failed (No such file or directory)"
    );
}

#[test]
fn errors_belong_to_their_file() {
    let loader = MemoryLoader::new()
        .with("main.conf", "daemon on;\ninclude bad.conf;")
        .with("bad.conf", "\nlisten 80;");
    let resp = run(&loader, "main.conf", ParseOptions::default());
    assert_eq!(resp.status, Status::Failed);
    assert_eq!(resp.config[0].status, Status::Ok);
    assert_eq!(resp.config[1].status, Status::Failed);
    assert_eq!(resp.errors[0].path, "bad.conf");
    assert_eq!(resp.errors[0].line, Some(2));
}

// -----------------------------------------------------------
// On-disk loader.
// -----------------------------------------------------------

#[test]
fn fs_loader_follows_sorted_globs() {
    let dir = tempfile::tempdir().unwrap();
    let conf_d = dir.path().join("conf.d");
    fs::create_dir(&conf_d).unwrap();
    fs::write(conf_d.join("20-b.conf"), "server { listen 81; }\n").unwrap();
    fs::write(conf_d.join("10-a.conf"), "server { listen 80; }\n").unwrap();
    let main = dir.path().join("nginx.conf");
    fs::write(&main, "http {\n    include conf.d/*.conf;\n}\n").unwrap();

    let resp = parse(main.to_str().unwrap(), &ParseOptions::default());
    assert!(resp.is_ok(), "{:?}", resp.errors);
    assert_eq!(resp.config.len(), 3);
    assert!(resp.config[1].path.ends_with("10-a.conf"));
    assert!(resp.config[2].path.ends_with("20-b.conf"));
}

#[test]
fn fs_loader_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let main = dir.path().join("nginx.conf");
    let resp = parse(main.to_str().unwrap(), &ParseOptions::default());
    assert_eq!(resp.status, Status::Failed);
    assert!(resp.errors[0].message.starts_with("open() "));
}
