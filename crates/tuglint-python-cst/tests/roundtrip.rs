// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Round-trip tests for the typed tree.
//!
//! For every input these tests check that:
//!
//! - the leaves of the root, with the leading prefix, concatenate back to
//!   the source
//! - every node's text equals the source slice under its span
//! - every node except the root has a parent that lists it as a child
//!
//! # Adding New Tests
//!
//! To add a fixture-based test, create a `.py` file in `tests/fixtures/`
//! and add a corresponding `roundtrip_fixture_<name>` test function.

use std::path::PathBuf;

use difference::assert_diff;
use itertools::Itertools;
use tuglint_python_cst::{parse_module, prettify_error, Child, Kind, ParseOptions, Tree};

/// Helper to visualize whitespace differences in test output
fn visualize(s: &str) -> String {
    s.replace(' ', "▩").lines().join("↩\n")
}

fn parse(input: &str, label: &str) -> Tree {
    match parse_module(input, ParseOptions::default()) {
        Ok(tree) => tree,
        Err(e) => panic!("{}", prettify_error(&e, input, label)),
    }
}

fn assert_roundtrip(input: &str, label: &str) {
    let tree = parse(input, label);

    // Node text starts at the first token; what precedes it is that token's prefix.
    let generated = format!("{}{}", tree.first_token(tree.root()).prefix, tree.text(tree.root()));
    if generated != input {
        let got = visualize(&generated);
        let expected = visualize(input);
        assert_diff!(expected.as_ref(), got.as_ref(), "", 0);
    }

    for id in tree.ids() {
        let span = tree.span(id);
        assert_eq!(
            tree.text(id),
            &input[span.range()],
            "{}: text of {} {:?} does not match its span",
            label,
            tree.kind(id),
            id
        );
    }

    assert_eq!(tree.parent(tree.root()), None);
    for id in tree.ids().filter(|&id| id != tree.root()) {
        let parent = tree
            .parent(id)
            .unwrap_or_else(|| panic!("{}: {} {:?} has no parent", label, tree.kind(id), id));
        assert!(
            tree.children(parent).contains(&Child::Node(id)),
            "{}: {:?} is not a child of its parent",
            label,
            id
        );
    }
}

fn assert_roundtrip_fixture(fixture_name: &str) {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(fixture_name);

    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", fixture_name, e));

    assert_roundtrip(&contents, fixture_name);
}

// =============================================================================
// Fixture-based round-trip tests
// =============================================================================

#[test]
fn roundtrip_fixture_classes() {
    assert_roundtrip_fixture("classes.py");
}

#[test]
fn roundtrip_fixture_control_flow() {
    assert_roundtrip_fixture("control_flow.py");
}

#[test]
fn roundtrip_fixture_expressions() {
    assert_roundtrip_fixture("expressions.py");
}

// =============================================================================
// Inline round-trip tests
// =============================================================================

#[test]
fn roundtrip_empty_and_blank() {
    assert_roundtrip("", "empty");
    assert_roundtrip("\n\n", "blank lines");
    assert_roundtrip("# only a comment\n", "comment");
}

#[test]
fn roundtrip_no_trailing_newline() {
    assert_roundtrip("x = 1", "no newline");
    assert_roundtrip("if x:\n    pass", "block without newline");
}

#[test]
fn roundtrip_comments_and_continuations() {
    let source = "x = [  # open\n    1,\n    2,  # two\n]\ny = 1 + \\\n    2\n# trailing\n";
    assert_roundtrip(source, "comments");
}

#[test]
fn roundtrip_crlf() {
    assert_roundtrip("if x:\r\n    y = 1\r\nz = 2\r\n", "crlf");
}

#[test]
fn roundtrip_nested_blocks_with_dedent_comments() {
    let source = "\
class A:
    def f(self):
        if self:
            return 1
    # between methods
    def g(self):
        return [i for i in range(3)]
# after class
";
    assert_roundtrip(source, "nested");
}

#[test]
fn roundtrip_semicolons_and_one_line_bodies() {
    assert_roundtrip("a = 1; b = 2;\nif a: b = 3; c = 4\n", "semicolons");
    assert_roundtrip("def f(): return 1\nclass C: pass\n", "one-liners");
}

#[test]
fn roundtrip_decorators_and_parameters() {
    let source = "\
@decorator
@module.factory(1, key='v')
def f(a, b: int = 2, /, c=3, *args, d, e: str = 'x', **kwargs) -> None:
    return lambda x, *, y=1: x + y
";
    assert_roundtrip(source, "decorators");
}

// =============================================================================
// Structure
// =============================================================================

#[test]
fn test_every_kind_has_a_name() {
    let names: Vec<String> = Kind::ALL.iter().map(|k| k.to_string()).collect();
    assert_eq!(names.iter().unique().count(), names.len());
}

#[test]
fn test_statement_lists_hold_statements() {
    let tree = parse("x = 1\nif x:\n    y = 2\n    z = 3\n", "lists");
    let lists: Vec<_> = tree
        .ids()
        .filter(|&id| tree.is(id, Kind::StatementList))
        .collect();
    assert_eq!(lists.len(), 2);
    for list in lists {
        for child in tree.child_nodes(list) {
            assert!(tree.kind(child).is_statement(), "{}", tree.kind(child));
        }
    }
}

#[test]
fn test_ancestors_reach_the_root() {
    let tree = parse("def f():\n    return g(x)\n", "ancestors");
    let x = tree
        .ids()
        .find(|&id| tree.is(id, Kind::Name) && tree.text(id) == "x")
        .unwrap();
    let kinds: Vec<Kind> = tree.ancestors(x).map(|a| tree.kind(a)).collect();
    assert_eq!(kinds.last(), Some(&Kind::FileInput));
    assert!(kinds.contains(&Kind::CallExpr));
    assert!(kinds.contains(&Kind::ReturnStmt));
    assert_eq!(
        tree.first_ancestor_of(x, &[Kind::FuncDef, Kind::ClassDef])
            .map(|id| tree.kind(id)),
        Some(Kind::FuncDef)
    );
}
