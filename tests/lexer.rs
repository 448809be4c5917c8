//! Lexer edge cases and error tests.

use nginx_conf_rs::{LexErrorKind, Lexer, Token, tokenize};

fn texts(input: &str) -> Vec<String> {
    tokenize(input)
        .expect("tokenize")
        .into_iter()
        .map(|t| t.text)
        .collect()
}

// -----------------------------------------------------------
// Basic lexer behaviour.
// -----------------------------------------------------------

#[test]
fn lex_empty_input() {
    assert!(tokenize("").expect("tokenize").is_empty());
}

#[test]
fn lex_only_whitespace() {
    assert!(tokenize("   \t  \n\n  ").expect("tokenize").is_empty());
}

#[test]
fn lex_multiple_comments() {
    let tokens = tokenize("# comment 1\n# comment 2\n").expect("tokenize");
    assert_eq!(tokens.len(), 2);
    assert!(tokens.iter().all(Token::is_comment));
    assert_eq!(tokens[1].line, 2);
}

#[test]
fn lex_comment_at_eof() {
    assert_eq!(texts("daemon off; #x"), ["daemon", "off", ";", "#x"]);
}

#[test]
fn lex_crlf_line_endings() {
    let tokens = tokenize("a;\r\n# c\r\nb;").expect("tokenize");
    assert_eq!(tokens[2].text, "# c");
    assert_eq!(tokens[2].line, 2);
    assert_eq!(tokens[3].line, 3);
}

#[test]
fn lex_nested_blocks() {
    assert_eq!(
        texts("http {\n  server {\n    listen 80;\n  }\n}\n"),
        ["http", "{", "server", "{", "listen", "80", ";", "}", "}"]
    );
}

// -----------------------------------------------------------
// Quoting and escapes.
// -----------------------------------------------------------

#[test]
fn lex_quoted_with_newline() {
    let tokens = tokenize("root \"a\nb\" ;").expect("tokenize");
    assert_eq!(tokens[1].text, "a\nb");
    assert_eq!(tokens[1].line, 1);
    assert_eq!(tokens[2].line, 2);
}

#[test]
fn lex_quoted_escapes_decode() {
    let tokens = tokenize(r#""a\"b\\c\d""#).expect("tokenize");
    assert_eq!(tokens[0].text, r#"a"b\cd"#);
}

#[test]
fn lex_single_quotes() {
    let tokens = tokenize(r#"'say "hi"'"#).expect("tokenize");
    assert_eq!(tokens[0].text, r#"say "hi""#);
    assert!(tokens[0].quoted);
}

#[test]
fn lex_quoted_delimiters_are_arguments() {
    let tokens = tokenize(r#"return 200 "{;}";"#).expect("tokenize");
    assert_eq!(tokens[2].text, "{;}");
    assert!(!tokens[2].is_delimiter());
    assert!(tokens[3].is(";"));
}

#[test]
fn lex_quoted_hash_is_not_comment() {
    let tokens = tokenize("\"#x\";").expect("tokenize");
    assert!(!tokens[0].is_comment());
}

#[test]
fn lex_bare_word_keeps_escapes() {
    assert_eq!(texts(r"a\ b;"), [r"a\ b", ";"]);
}

#[test]
fn lex_dollar_without_brace() {
    assert_eq!(texts("set $host;"), ["set", "$host", ";"]);
}

#[test]
fn lex_expansion_spans_whitespace() {
    assert_eq!(texts("set ${a b};"), ["set", "${a b}", ";"]);
}

#[test]
fn lex_expansion_inside_quotes_is_verbatim() {
    let tokens = tokenize(r#""x${a"\b}y""#).expect("tokenize");
    assert_eq!(tokens[0].text, r#"x${a"\b}y"#);
}

#[test]
fn lex_escaped_dollar_is_not_expansion() {
    assert_eq!(texts(r"x\${a b}"), [r"x\$", "{", "a", "b", "}"]);
}

// -----------------------------------------------------------
// Errors.
// -----------------------------------------------------------

#[test]
fn lex_error_unterminated_single_quote() {
    let err = tokenize("root 'abc").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedQuote { delim: '\'' });
}

#[test]
fn lex_error_reports_start_line() {
    let err = tokenize("a;\nb \"c\nd").unwrap_err();
    assert_eq!(err.line, 2);
}

#[test]
fn lex_error_dangling_dollar() {
    let err = tokenize("return a$").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::DanglingEscape('$'));
}

#[test]
fn lex_error_dangling_reports_token_line() {
    let err = tokenize("return a\\\nb$").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::DanglingEscape('$'));
    assert_eq!(err.line, 1);
}

#[test]
fn lex_error_unterminated_expansion_in_quotes() {
    let err = tokenize("\"${abc\"").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedExpansion);
}

#[test]
fn lex_error_display() {
    let err = tokenize("a \"b").unwrap_err();
    assert_eq!(
        err.to_string(),
        "unterminated quoted string, expecting \" at line 1"
    );
}

#[test]
fn lexer_stops_after_error() {
    let items: Vec<_> = Lexer::new("a \"b").collect();
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(items[1].is_err());
}
