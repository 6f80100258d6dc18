// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use crate::tokenizer::{Keyword, Punct, TokErrorKind, TokState, TokType, Token};

fn tokenize(text: &str) -> Vec<Token> {
    TokState::new(text).tokenize().expect("tokenize error")
}

fn kinds_and_values(text: &str) -> Vec<(TokType, String)> {
    tokenize(text)
        .into_iter()
        .map(|t| (t.kind, t.value))
        .collect()
}

fn error_kind(text: &str) -> TokErrorKind {
    TokState::new(text).tokenize().expect_err("expected error").kind
}

#[test]
fn test_identifier_and_keywords() {
    assert_eq!(
        kinds_and_values("if x_1"),
        vec![
            (TokType::Keyword(Keyword::If), "if".to_string()),
            (TokType::Name, "x_1".to_string()),
            (TokType::Newline, String::new()),
            (TokType::EndMarker, String::new()),
        ]
    );
}

#[test]
fn test_async_is_a_name() {
    let tokens = tokenize("async def f(): await g()\n");
    assert_eq!(tokens[0].kind, TokType::Name);
    assert_eq!(tokens[0].value, "async");
    assert_eq!(tokens[1].kind, TokType::Keyword(Keyword::Def));
}

#[test]
fn test_numbers() {
    for number in ["0", "42", "1_000", "0x1F", "0b1010", "0o777", "3.14", "1.", ".5", "1e10", "2.5E-3", "3j", "1_0.0_1e+1_0J"] {
        let tokens = tokenize(number);
        assert_eq!(tokens[0].kind, TokType::Number, "{}", number);
        assert_eq!(tokens[0].value, number);
    }
}

#[test]
fn test_strings_with_prefixes() {
    for string in [r#""abc""#, "'abc'", r#"b"x""#, r#"Rb'\d'"#, r#"f"{x}""#, r#""a\"b""#, "'''multi\nline'''", r#""""doc""""#] {
        let tokens = tokenize(string);
        assert_eq!(tokens[0].kind, TokType::String, "{}", string);
        assert_eq!(tokens[0].value, string);
    }
}

#[test]
fn test_multiline_string_advances_lines() {
    let tokens = tokenize("x = '''a\nb\nc'''\ny\n");
    let y = tokens.iter().find(|t| t.value == "y").expect("y");
    assert_eq!(y.line(), 4);
    assert_eq!(y.column(), 0);
}

#[test]
fn test_operators_longest_match() {
    let values: Vec<_> = kinds_and_values("a **= b // c -> d := e ... f")
        .into_iter()
        .filter_map(|(k, v)| match k {
            TokType::Punct(p) => Some((p, v)),
            _ => None,
        })
        .collect();
    assert_eq!(
        values,
        vec![
            (Punct::DoubleStarEqual, "**=".to_string()),
            (Punct::DoubleSlash, "//".to_string()),
            (Punct::Arrow, "->".to_string()),
            (Punct::ColonEqual, ":=".to_string()),
            (Punct::Ellipsis, "...".to_string()),
        ]
    );
}

#[test]
fn test_indent_dedent() {
    let kinds: Vec<_> = tokenize("if x:\n    y\nz\n")
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokType::Keyword(Keyword::If),
            TokType::Name,
            TokType::Punct(Punct::Colon),
            TokType::Newline,
            TokType::Indent,
            TokType::Name,
            TokType::Newline,
            TokType::Dedent,
            TokType::Name,
            TokType::Newline,
            TokType::EndMarker,
        ]
    );
}

#[test]
fn test_dedents_at_end_of_file() {
    let tokens = tokenize("def f():\n    if x:\n        y");
    let tail: Vec<_> = tokens.iter().rev().take(4).map(|t| t.kind).collect();
    assert_eq!(
        tail,
        vec![
            TokType::EndMarker,
            TokType::Dedent,
            TokType::Dedent,
            TokType::Newline,
        ]
    );
}

#[test]
fn test_implicit_line_joining() {
    let kinds: Vec<_> = tokenize("f(a,\n  b)\n").into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds.iter().filter(|k| **k == TokType::Newline).count(), 1);
    assert!(!kinds.contains(&TokType::Indent));
}

#[test]
fn test_explicit_line_joining() {
    let tokens = tokenize("x = 1 + \\\n    2\n");
    let two = tokens.iter().find(|t| t.value == "2").expect("2");
    assert_eq!(two.line(), 2);
    assert_eq!(two.prefix, " \\\n    ");
}

#[test]
fn test_comments_become_trivia_of_next_token() {
    let tokens = tokenize("# header\n\nx = 1  # trailing\ny = 2\n");
    assert_eq!(tokens[0].value, "x");
    assert_eq!(tokens[0].prefix, "# header\n\n");
    assert_eq!(tokens[0].trivia.len(), 1);
    assert_eq!(tokens[0].trivia[0].value, "# header");
    assert_eq!(tokens[0].trivia[0].range.start.line, 1);

    let newline = &tokens[3];
    assert_eq!(newline.kind, TokType::Newline);
    assert_eq!(newline.trivia[0].value, "# trailing");
}

#[test]
fn test_prefixes_reconstruct_source() {
    let source = "import os\n\n\nclass A(object):  # c\n    def f(self, *a):\n        return [x\n                for x in a]\n";
    let rebuilt: String = tokenize(source)
        .iter()
        .map(|t| format!("{}{}", t.prefix, t.value))
        .collect();
    assert_eq!(rebuilt, source);
}

#[test]
fn test_virtual_tokens_have_no_text() {
    for token in tokenize("if a:\n  b\n") {
        if token.is_virtual() {
            assert!(token.value.is_empty());
            assert!(token.prefix.is_empty());
        }
    }
}

#[test]
fn test_end_marker_keeps_trailing_comments() {
    let tokens = tokenize("x\n# tail\n");
    let end = tokens.last().expect("end marker");
    assert_eq!(end.kind, TokType::EndMarker);
    assert_eq!(end.prefix, "# tail\n");
    assert_eq!(end.trivia.len(), 1);
}

#[test]
fn test_crlf_newlines() {
    let tokens = tokenize("a\r\nb\r\n");
    assert_eq!(tokens[1].value, "\r\n");
    assert_eq!(tokens[2].value, "b");
    assert_eq!(tokens[2].line(), 2);
}

#[test]
fn test_positions_count_characters() {
    let tokens = tokenize("é = 'ü'; x\n");
    let x = tokens.iter().find(|t| t.value == "x").expect("x");
    assert_eq!(x.column(), 9);
    assert_eq!(x.span.start, 11);
}

#[test]
fn test_errors() {
    assert_eq!(error_kind("x = 'abc\n"), TokErrorKind::UnterminatedString);
    assert_eq!(
        error_kind("x = '''abc\n"),
        TokErrorKind::UnterminatedTripleQuotedString
    );
    assert_eq!(error_kind("if x:\n    a\n  b\n"), TokErrorKind::Dedent);
    assert_eq!(error_kind("x = $"), TokErrorKind::BadCharacter('$'));
    assert_eq!(error_kind("f(a]"), TokErrorKind::UnmatchedBracket(']'));
    assert_eq!(error_kind("f(a"), TokErrorKind::UnclosedBracket('('));
    assert_eq!(error_kind("x = \\ y"), TokErrorKind::LineContinuation);
}

#[test]
fn test_error_position() {
    let err = TokState::new("a = 1\nb = $\n").tokenize().expect_err("error");
    assert_eq!(err.position.line, 2);
    assert_eq!(err.position.column, 4);
    assert_eq!(err.offset, 10);
}
