//! Built-in directive definitions for the core server and its
//! standard modules.

use crate::analyzer::{Arity as A, BlockRule, Context as C, Contexts, DirectiveRule as R};

const ALL: Contexts = Contexts::of(&C::ALL);

const MAIN: Contexts = Contexts::of(&[C::Main]);
const EVENTS: Contexts = Contexts::of(&[C::Events]);

const HTTP_MAIN: Contexts = Contexts::of(&[C::Http]);
const HTTP_SRV: Contexts = Contexts::of(&[C::HttpServer]);
const HTTP_LOC: Contexts = Contexts::of(&[C::HttpLocation]);
const HTTP_UPS: Contexts = Contexts::of(&[C::HttpUpstream]);
const HTTP_MS: Contexts = Contexts::of(&[C::Http, C::HttpServer]);
const HTTP_SL: Contexts = Contexts::of(&[C::HttpServer, C::HttpLocation]);
const HTTP_MSL: Contexts = Contexts::of(&[C::Http, C::HttpServer, C::HttpLocation]);
const HTTP_MSL_LIF: Contexts =
    Contexts::of(&[C::Http, C::HttpServer, C::HttpLocation, C::HttpLocationIf]);
const HTTP_MSL_LMT: Contexts =
    Contexts::of(&[C::Http, C::HttpServer, C::HttpLocation, C::HttpLimitExcept]);
const HTTP_LOC_LIF: Contexts = Contexts::of(&[C::HttpLocation, C::HttpLocationIf]);
const HTTP_LOC_LIF_LMT: Contexts =
    Contexts::of(&[C::HttpLocation, C::HttpLocationIf, C::HttpLimitExcept]);
const HTTP_REWRITE: Contexts = Contexts::of(&[
    C::HttpServer,
    C::HttpServerIf,
    C::HttpLocation,
    C::HttpLocationIf,
]);
const HTTP_LOG: Contexts = Contexts::of(&[
    C::Http,
    C::HttpServer,
    C::HttpLocation,
    C::HttpLocationIf,
    C::HttpLimitExcept,
]);

const STREAM_MAIN: Contexts = Contexts::of(&[C::Stream]);
const STREAM_SRV: Contexts = Contexts::of(&[C::StreamServer]);
const STREAM_UPS: Contexts = Contexts::of(&[C::StreamUpstream]);
const STREAM_MS: Contexts = Contexts::of(&[C::Stream, C::StreamServer]);

const MAIL_MAIN: Contexts = Contexts::of(&[C::Mail]);
const MAIL_SRV: Contexts = Contexts::of(&[C::MailServer]);
const MAIL_MS: Contexts = Contexts::of(&[C::Mail, C::MailServer]);

const ERROR_LOG: Contexts = Contexts::of(&[
    C::Main,
    C::Http,
    C::HttpServer,
    C::HttpLocation,
    C::Stream,
    C::StreamServer,
    C::Mail,
    C::MailServer,
]);

const TAKE34: A = A::TAKE3.or(A::TAKE4);
const NOARGS_OR_TAKE1: A = A::NOARGS.or(A::TAKE1);

pub static BUILTIN: &[(&str, &[R])] = &[
    // core
    ("daemon", &[R::leaf(MAIN, A::FLAG)]),
    ("debug_points", &[R::leaf(MAIN, A::TAKE1)]),
    ("env", &[R::leaf(MAIN, A::TAKE1)]),
    ("error_log", &[R::leaf(ERROR_LOG, A::ONE_MORE)]),
    ("events", &[R::block(MAIN, A::NOARGS)]),
    ("http", &[R::block(MAIN, A::NOARGS)]),
    ("include", &[R::leaf(ALL, A::TAKE1)]),
    ("load_module", &[R::leaf(MAIN, A::TAKE1)]),
    ("lock_file", &[R::leaf(MAIN, A::TAKE1)]),
    ("mail", &[R::block(MAIN, A::NOARGS)]),
    ("master_process", &[R::leaf(MAIN, A::FLAG)]),
    ("pcre_jit", &[R::leaf(MAIN, A::FLAG)]),
    ("pid", &[R::leaf(MAIN, A::TAKE1)]),
    ("stream", &[R::block(MAIN, A::NOARGS)]),
    ("thread_pool", &[R::leaf(MAIN, A::TAKE23)]),
    ("timer_resolution", &[R::leaf(MAIN, A::TAKE1)]),
    ("user", &[R::leaf(MAIN, A::TAKE12)]),
    ("worker_cpu_affinity", &[R::leaf(MAIN, A::ONE_MORE)]),
    ("worker_priority", &[R::leaf(MAIN, A::TAKE1)]),
    ("worker_processes", &[R::leaf(MAIN, A::TAKE1)]),
    ("worker_rlimit_nofile", &[R::leaf(MAIN, A::TAKE1)]),
    ("worker_shutdown_timeout", &[R::leaf(MAIN, A::TAKE1)]),
    ("working_directory", &[R::leaf(MAIN, A::TAKE1)]),
    // events
    ("accept_mutex", &[R::leaf(EVENTS, A::FLAG)]),
    ("accept_mutex_delay", &[R::leaf(EVENTS, A::TAKE1)]),
    ("debug_connection", &[R::leaf(EVENTS, A::TAKE1)]),
    ("multi_accept", &[R::leaf(EVENTS, A::FLAG)]),
    ("use", &[R::leaf(EVENTS, A::TAKE1)]),
    ("worker_connections", &[R::leaf(EVENTS, A::TAKE1)]),
    // http core
    ("absolute_redirect", &[R::leaf(HTTP_MSL, A::FLAG)]),
    ("alias", &[R::leaf(HTTP_LOC, A::TAKE1)]),
    ("client_body_buffer_size", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    ("client_body_timeout", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    ("client_header_timeout", &[R::leaf(HTTP_MS, A::TAKE1)]),
    ("client_max_body_size", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    ("default_type", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    ("error_page", &[R::leaf(HTTP_MSL_LIF, A::TWO_MORE)]),
    ("etag", &[R::leaf(HTTP_MSL, A::FLAG)]),
    ("internal", &[R::leaf(HTTP_LOC, A::NOARGS)]),
    ("keepalive_timeout", &[R::leaf(HTTP_MSL, A::TAKE12)]),
    ("large_client_header_buffers", &[R::leaf(HTTP_MS, A::TAKE2)]),
    ("limit_except", &[R::block(HTTP_LOC, A::ONE_MORE)]),
    ("limit_rate", &[R::leaf(HTTP_MSL_LIF, A::TAKE1)]),
    (
        "listen",
        &[
            R::leaf(HTTP_SRV, A::ONE_MORE),
            R::leaf(STREAM_SRV, A::ONE_MORE),
            R::leaf(MAIL_SRV, A::ONE_MORE),
        ],
    ),
    ("location", &[R::block(HTTP_SL, A::TAKE12)]),
    ("open_file_cache", &[R::leaf(HTTP_MSL, A::TAKE12)]),
    (
        "resolver",
        &[
            R::leaf(HTTP_MSL, A::ONE_MORE),
            R::leaf(STREAM_MS, A::ONE_MORE),
            R::leaf(MAIL_MS, A::ONE_MORE),
        ],
    ),
    ("root", &[R::leaf(HTTP_MSL_LIF, A::TAKE1)]),
    ("sendfile", &[R::leaf(HTTP_MSL_LIF, A::FLAG)]),
    (
        "server",
        &[
            R::block(HTTP_MAIN, A::NOARGS),
            R::leaf(HTTP_UPS, A::ONE_MORE),
            R::block(STREAM_MAIN, A::NOARGS),
            R::leaf(STREAM_UPS, A::ONE_MORE),
            R::block(MAIL_MAIN, A::NOARGS),
        ],
    ),
    (
        "server_name",
        &[R::leaf(HTTP_SRV, A::ONE_MORE), R::leaf(MAIL_MS, A::TAKE1)],
    ),
    ("server_names_hash_bucket_size", &[R::leaf(HTTP_MAIN, A::TAKE1)]),
    ("server_tokens", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    ("tcp_nodelay", &[R::leaf(HTTP_MSL, A::FLAG), R::leaf(STREAM_MS, A::FLAG)]),
    ("tcp_nopush", &[R::leaf(HTTP_MSL, A::FLAG)]),
    ("try_files", &[R::leaf(HTTP_SL, A::TWO_MORE)]),
    ("types", &[R::block(HTTP_MSL, A::NOARGS)]),
    ("types_hash_max_size", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    // http modules
    (
        "access_log",
        &[R::leaf(HTTP_LOG, A::ONE_MORE), R::leaf(STREAM_MS, A::ONE_MORE)],
    ),
    ("add_header", &[R::leaf(HTTP_MSL_LIF, A::TAKE23)]),
    (
        "allow",
        &[R::leaf(HTTP_MSL_LMT, A::TAKE1), R::leaf(STREAM_MS, A::TAKE1)],
    ),
    ("auth_basic", &[R::leaf(HTTP_MSL_LMT, A::TAKE1)]),
    ("auth_basic_user_file", &[R::leaf(HTTP_MSL_LMT, A::TAKE1)]),
    ("autoindex", &[R::leaf(HTTP_MSL, A::FLAG)]),
    ("break", &[R::leaf(HTTP_REWRITE, A::NOARGS)]),
    ("charset", &[R::leaf(HTTP_MSL_LIF, A::TAKE1)]),
    ("charset_map", &[R::block(HTTP_MAIN, A::TAKE2)]),
    (
        "deny",
        &[R::leaf(HTTP_MSL_LMT, A::TAKE1), R::leaf(STREAM_MS, A::TAKE1)],
    ),
    ("expires", &[R::leaf(HTTP_MSL_LIF, A::TAKE12)]),
    ("fastcgi_index", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    ("fastcgi_param", &[R::leaf(HTTP_MSL, A::TAKE23)]),
    ("fastcgi_pass", &[R::leaf(HTTP_LOC_LIF, A::TAKE1)]),
    ("geo", &[R::block(HTTP_MAIN, A::TAKE12), R::block(STREAM_MAIN, A::TAKE12)]),
    ("gzip", &[R::leaf(HTTP_MSL_LIF, A::FLAG)]),
    ("gzip_comp_level", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    ("gzip_min_length", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    ("gzip_types", &[R::leaf(HTTP_MSL, A::ONE_MORE)]),
    ("hash", &[R::leaf(HTTP_UPS, A::TAKE12), R::leaf(STREAM_UPS, A::TAKE12)]),
    ("http2", &[R::leaf(HTTP_MS, A::FLAG)]),
    ("if", &[R::block(HTTP_SL, A::ONE_MORE)]),
    ("index", &[R::leaf(HTTP_MSL, A::ONE_MORE)]),
    ("ip_hash", &[R::leaf(HTTP_UPS, A::NOARGS)]),
    ("keepalive", &[R::leaf(HTTP_UPS, A::TAKE1)]),
    ("least_conn", &[R::leaf(HTTP_UPS, A::NOARGS), R::leaf(STREAM_UPS, A::NOARGS)]),
    ("limit_conn", &[R::leaf(HTTP_MSL, A::TAKE2), R::leaf(STREAM_MS, A::TAKE2)]),
    ("limit_conn_zone", &[R::leaf(HTTP_MAIN, A::TAKE2), R::leaf(STREAM_MAIN, A::TAKE2)]),
    ("limit_req", &[R::leaf(HTTP_MSL, A::TAKE123)]),
    ("limit_req_zone", &[R::leaf(HTTP_MAIN, TAKE34)]),
    (
        "log_format",
        &[R::leaf(HTTP_MAIN, A::TWO_MORE), R::leaf(STREAM_MAIN, A::TWO_MORE)],
    ),
    ("map", &[R::block(HTTP_MAIN, A::TAKE2), R::block(STREAM_MAIN, A::TAKE2)]),
    ("proxy_buffering", &[R::leaf(HTTP_MSL, A::FLAG)]),
    ("proxy_cache", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    ("proxy_cache_path", &[R::leaf(HTTP_MAIN, A::TWO_MORE)]),
    (
        "proxy_connect_timeout",
        &[R::leaf(HTTP_MSL, A::TAKE1), R::leaf(STREAM_MS, A::TAKE1)],
    ),
    ("proxy_http_version", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    (
        "proxy_pass",
        &[R::leaf(HTTP_LOC_LIF_LMT, A::TAKE1), R::leaf(STREAM_SRV, A::TAKE1)],
    ),
    ("proxy_read_timeout", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    ("proxy_redirect", &[R::leaf(HTTP_MSL, A::TAKE12)]),
    ("proxy_set_header", &[R::leaf(HTTP_MSL, A::TAKE2)]),
    ("proxy_timeout", &[R::leaf(STREAM_MS, A::TAKE1)]),
    ("real_ip_header", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    ("return", &[R::leaf(HTTP_REWRITE, A::TAKE12), R::leaf(STREAM_SRV, A::TAKE1)]),
    ("rewrite", &[R::leaf(HTTP_REWRITE, A::TAKE23)]),
    ("set", &[R::leaf(HTTP_REWRITE, A::TAKE2)]),
    ("set_real_ip_from", &[R::leaf(HTTP_MSL, A::TAKE1)]),
    ("split_clients", &[R::block(HTTP_MAIN, A::TAKE2), R::block(STREAM_MAIN, A::TAKE2)]),
    (
        "ssl_certificate",
        &[
            R::leaf(HTTP_MS, A::TAKE1),
            R::leaf(STREAM_MS, A::TAKE1),
            R::leaf(MAIL_MS, A::TAKE1),
        ],
    ),
    (
        "ssl_certificate_key",
        &[
            R::leaf(HTTP_MS, A::TAKE1),
            R::leaf(STREAM_MS, A::TAKE1),
            R::leaf(MAIL_MS, A::TAKE1),
        ],
    ),
    ("ssl_ciphers", &[R::leaf(HTTP_MS, A::TAKE1), R::leaf(STREAM_MS, A::TAKE1)]),
    ("ssl_prefer_server_ciphers", &[R::leaf(HTTP_MS, A::FLAG)]),
    ("ssl_preread", &[R::leaf(STREAM_MS, A::FLAG)]),
    ("ssl_protocols", &[R::leaf(HTTP_MS, A::ONE_MORE), R::leaf(STREAM_MS, A::ONE_MORE)]),
    ("ssl_session_cache", &[R::leaf(HTTP_MS, A::TAKE12)]),
    ("ssl_session_timeout", &[R::leaf(HTTP_MS, A::TAKE1)]),
    ("ssl_stapling", &[R::leaf(HTTP_MS, A::FLAG)]),
    (
        "stub_status",
        &[R::new(HTTP_SL, NOARGS_OR_TAKE1, BlockRule::Forbidden)],
    ),
    ("sub_filter", &[R::leaf(HTTP_MSL, A::TAKE2)]),
    ("upstream", &[R::block(HTTP_MAIN, A::TAKE1), R::block(STREAM_MAIN, A::TAKE1)]),
    ("uwsgi_pass", &[R::leaf(HTTP_LOC_LIF, A::TAKE1)]),
    ("zone", &[R::leaf(HTTP_UPS, A::TAKE12), R::leaf(STREAM_UPS, A::TAKE12)]),
    // mail
    ("auth_http", &[R::leaf(MAIL_MS, A::TAKE1)]),
    ("protocol", &[R::leaf(MAIL_SRV, A::TAKE1)]),
];
