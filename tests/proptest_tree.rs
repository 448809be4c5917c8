//! Property tests over generated statement trees.
//!
//! Building a tree and parsing it back must give the same tree apart
//! from line numbers, and building is idempotent once a tree has been
//! through the parser.

mod common;

use common::{strip_lines, syntax_only};
use nginx_conf_rs::{BuildOptions, Statement, build, parse_str};
use proptest::prelude::*;

// -- Leaf strategies --

/// Directive names, with `if` weighted up since its arguments are
/// written inside parentheses.
fn directive_name() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z][a-z0-9_]{0,11}",
        1 => Just("if".to_string()),
    ]
}

fn argument() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z0-9/._:=-]{1,12}",
        1 => "\\PC{0,12}",
        1 => prop::collection::vec(
            prop_oneof![
                Just("$"), Just("${"), Just("{"), Just("}"), Just("\\"),
                Just("\""), Just(";"), Just("#"), Just(" "), Just("\n"), Just("v"),
            ],
            0..=6,
        )
        .prop_map(|parts| parts.concat()),
    ]
}

fn arguments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(argument(), 0..=4)
}

/// Comment text: one line of printable ASCII.
fn comment() -> impl Strategy<Value = Statement> {
    "[ -~]{0,20}".prop_map(|text| Statement::comment(text))
}

/// Statement at a given depth (limits recursion).
fn statement(depth: u32) -> impl Strategy<Value = Statement> {
    let leaf = (directive_name(), arguments())
        .prop_map(|(name, args)| Statement::new(name).with_args(args));

    if depth == 0 {
        prop_oneof![4 => leaf, 1 => comment()].boxed()
    } else {
        let with_block = (
            directive_name(),
            arguments(),
            prop::collection::vec(statement(depth - 1), 0..=3),
        )
            .prop_map(|(name, args, children)| Statement::new(name).with_args(args).block(children));

        prop_oneof![
            3 => leaf,
            1 => comment(),
            1 => with_block,
        ]
        .boxed()
    }
}

fn tree() -> impl Strategy<Value = Vec<Statement>> {
    prop::collection::vec(statement(2), 0..=5)
}

fn reparse(text: &str) -> Result<Vec<Statement>, TestCaseError> {
    let resp = parse_str(text, &syntax_only());
    if !resp.is_ok() {
        return Err(TestCaseError::fail(format!(
            "parse errors: {:?}\n--- text ---\n{text}",
            resp.errors
        )));
    }
    Ok(resp.main().to_vec())
}

// -- Property tests --

proptest! {
    /// parse(build(t)) == t, ignoring line numbers.
    #[test]
    fn tree_round_trip(t in tree()) {
        let built = build(&t, &BuildOptions::default());
        let parsed = reparse(&built)?;
        prop_assert_eq!(strip_lines(&t), strip_lines(&parsed), "built:\n{}", built);
    }

    /// Once a tree carries real line numbers, build/parse is stable.
    #[test]
    fn build_is_idempotent(t in tree()) {
        let first = build(&t, &BuildOptions::default());
        let second = build(&reparse(&first)?, &BuildOptions::default());
        let third = build(&reparse(&second)?, &BuildOptions::default());
        prop_assert_eq!(second, third);
    }

    /// Indentation style never changes the parsed tree.
    #[test]
    fn indentation_is_cosmetic(t in tree(), width in 0usize..=8) {
        let spaces = reparse(&build(&t, &BuildOptions::new().indent(width)))?;
        let tabs = reparse(&build(&t, &BuildOptions::new().tabs(true)))?;
        prop_assert_eq!(strip_lines(&spaces), strip_lines(&tabs));
    }
}
