//! Build an nginx configuration from code and print it.

use nginx_conf_rs::{BuildOptions, Statement, build};

fn main() {
    let tree = vec![
        Statement::new("user").arg("nginx"),
        Statement::new("events").block(vec![Statement::new("worker_connections").arg("1024")]),
        Statement::new("http").block(vec![
            Statement::new("log_format")
                .arg("main")
                .arg("$remote_addr - $remote_user [$time_local] \"$request\""),
            Statement::new("server").block(vec![
                Statement::new("listen").arg("80"),
                Statement::new("server_name").arg("example.com"),
                Statement::new("location").arg("/").block(vec![
                    Statement::new("proxy_pass").arg("http://127.0.0.1:3000"),
                ]),
            ]),
        ]),
    ];

    print!("{}", build(&tree, &BuildOptions::new().header(true)));
}
