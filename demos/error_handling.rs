//! Show how recoverable and fatal errors are reported.

use nginx_conf_rs::{ParseOptions, parse_str};

fn main() {
    // Placement and argument errors are collected; the rest still parses.
    let resp = parse_str(
        "listen 80;\nworker_processes;\nhttp {\n    server {\n        listen 8080;\n    }\n}\n",
        &ParseOptions::default(),
    );
    println!("status: {:?}", resp.status);
    for err in &resp.errors {
        println!("  {err}");
    }
    println!("statements kept: {}", resp.main().len());

    println!();

    // An unterminated string ends the file; earlier statements survive.
    let resp = parse_str("daemon off;\nroot \"/srv\n", &ParseOptions::default());
    for err in &resp.errors {
        println!("  {err}");
    }
    println!("statements kept: {}", resp.main().len());

    println!();

    // Without error catching, parsing stops at the first problem.
    let resp = parse_str(
        "worker_processes;\nuser;\n",
        &ParseOptions::new().catch_errors(false),
    );
    println!("errors with catch_errors off: {}", resp.errors.len());
}
