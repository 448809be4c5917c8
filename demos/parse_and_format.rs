//! Parse configuration text, inspect it, and write it back out.

use nginx_conf_rs::{BuildOptions, ParseOptions, Statement, build, parse_str};

fn walk(statements: &[Statement], depth: usize) {
    for stmt in statements {
        if stmt.is_comment() {
            println!("{}#{}", "  ".repeat(depth), stmt.comment_text());
            continue;
        }
        println!("{}{} {:?} (line {})", "  ".repeat(depth), stmt.directive, stmt.args, stmt.line);
        if let Some(block) = &stmt.block {
            walk(block, depth + 1);
        }
    }
}

fn main() {
    let input = "\
http {
  # upstream app
  upstream app { server 127.0.0.1:3000; }
  server { listen 80; location / { proxy_pass http://app; } }
}
";

    let resp = parse_str(input, &ParseOptions::new().comments(true));
    if !resp.is_ok() {
        for err in &resp.errors {
            eprintln!("{err}");
        }
        return;
    }

    walk(resp.main(), 0);

    let output = build(resp.main(), &BuildOptions::new().indent(2));
    println!("\nFormatted output:\n{output}");
}
