// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A Python tokenizer, parser and typed syntax tree library.
//!
//! # Overview
//!
//! - **Tokenizing**: [`tokenize`] produces the full token stream, including
//!   virtual `INDENT`, `DEDENT`, `NEWLINE` and `ENDMARKER` tokens. Every
//!   token keeps the whitespace and comments before it.
//! - **Parsing**: [`parse_module`] runs the grammar over the tokens and
//!   converts the raw parse tree into a typed [`Tree`].
//! - **Traversal**: [`visitor::TreeVisitor`] walks a [`Tree`] with one
//!   method pair per payload type.
//!
//! The typed tree is lossless: concatenating the leaves of the root in order
//! gives back the source text.
//!
//! # Quick Start
//!
//! ```
//! use tuglint_python_cst::{parse_module, Kind, ParseOptions};
//!
//! let source = "def hello():\n    print('world')\n";
//! let tree = parse_module(source, ParseOptions::default()).expect("parse error");
//!
//! assert_eq!(tree.kind(tree.root()), Kind::FileInput);
//! assert_eq!(tree.text(tree.root()), source);
//! ```

// ============================================================================
// Public modules and re-exports
// ============================================================================

/// Python version abstraction for version-aware parsing.
pub mod version;
pub use version::{ParseOptions, PythonVersion};

/// Tokenizer for Python source code.
pub mod tokenizer;
pub use tokenizer::{Keyword, Punct, TokError, TokErrorKind, TokType, Token, Trivia};

/// Typed node payloads and the [`Tree`] arena.
pub mod nodes;
pub use nodes::*;

/// Visitor infrastructure for typed tree traversal.
pub mod visitor;
pub use visitor::{TreeVisitor, VisitResult};

mod builder;
mod parser;

// Re-export parser error types and the raw tree for tooling.
pub use parser::{BuildError, ParserError, RawTree, Result, Rule};

use tracing::debug;

// ============================================================================
// Parsing functions
// ============================================================================

/// Tokenizes Python source code into a sequence of tokens.
///
/// This is a low-level function. Most users should use [`parse_module`]
/// instead.
///
/// # Errors
///
/// Returns a [`ParserError::TokenizerError`] if the source contains invalid
/// tokens.
///
/// # Example
///
/// ```
/// use tuglint_python_cst::tokenize;
///
/// let tokens = tokenize("x = 1").expect("tokenize error");
/// assert!(!tokens.is_empty());
/// ```
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    Ok(tokenizer::TokState::new(text).tokenize()?)
}

/// Parses tokens into the raw, rule-tagged parse tree.
///
/// Most users should use [`parse_module`], which also builds typed nodes.
pub fn parse_raw(text: &str, options: ParseOptions) -> Result<RawTree> {
    let tokens = tokenize(text)?;
    parser::parse_tokens(tokens, options.version)
}

/// Parses a Python module into a typed [`Tree`].
///
/// A leading byte order mark is skipped; token spans are relative to the
/// text after it.
///
/// # Errors
///
/// - [`ParserError::TokenizerError`] for malformed tokens or indentation
/// - [`ParserError::SyntaxError`] when the grammar rejects the token stream
/// - [`ParserError::BuildError`] when the input breaks a rule the grammar
///   does not encode, such as an unparenthesized generator that is not the
///   sole call argument
///
/// # Example
///
/// ```
/// use tuglint_python_cst::{parse_module, ParseOptions};
///
/// let tree = parse_module("x = 1", ParseOptions::default()).expect("parse error");
/// assert_eq!(tree.text(tree.root()), "x = 1");
/// ```
pub fn parse_module(source: &str, options: ParseOptions) -> Result<Tree> {
    let text = source.strip_prefix('\u{feff}').unwrap_or(source);
    let raw = parse_raw(text, options)?;
    let tree = builder::build(&raw)?;
    debug!(
        version = ?options.version,
        nodes = tree.len(),
        "parsed module"
    );
    Ok(tree)
}

// ============================================================================
// Error formatting
// ============================================================================

/// Returns the byte offset of the beginning of line `n` (1-indexed).
fn bol_offset(source: &str, n: u32) -> usize {
    if n <= 1 {
        return 0;
    }
    source
        .match_indices('\n')
        .nth((n - 2) as usize)
        .map(|(index, _)| index + 1)
        .unwrap_or(source.len())
}

/// Formats a parser error with the relevant source line highlighted.
///
/// Errors without a byte range (build errors) are rendered against their
/// whole line.
///
/// # Example
///
/// ```
/// use tuglint_python_cst::{parse_module, prettify_error, ParseOptions};
///
/// let source = "def";
/// if let Err(e) = parse_module(source, ParseOptions::default()) {
///     let formatted = prettify_error(&e, source, "example.py");
///     assert!(formatted.contains("example.py"));
/// }
/// ```
pub fn prettify_error(err: &ParserError, source: &str, label: &str) -> String {
    use annotate_snippets::{Level, Renderer, Snippet};

    let line = err.line().max(1);
    let line_start = bol_offset(source, line);
    let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |i| line_start + i);
    let snippet_source = &source[line_start..line_end];

    let (start, end) = match err.byte_range() {
        Some(range) if range.start >= line_start && range.start <= line_end => {
            let start = range.start - line_start;
            let end = range.end.clamp(range.start, line_end) - line_start;
            (start, end)
        }
        _ => (0, snippet_source.len()),
    };
    // Zero-width errors still need a visible marker.
    let end = if start == end {
        (end + 1).min(snippet_source.len().max(start))
    } else {
        end
    };

    let message = err.to_string();
    let rendered = Renderer::plain()
        .render(
            Level::Error.title(label).snippet(
                Snippet::source(snippet_source)
                    .line_start(line as usize)
                    .fold(false)
                    .annotation(Level::Error.span(start..end).label(&message)),
            ),
        )
        .to_string();
    rendered
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bol_offset() {
        assert_eq!(0, bol_offset("hello", 1));
        assert_eq!(0, bol_offset("hello\nhello", 0));
        assert_eq!(6, bol_offset("hello\nhello", 2));
        assert_eq!(12, bol_offset("hello\nhello\nhello", 3));
        assert_eq!(11, bol_offset("hello\nhello", 3));
    }

    #[test]
    fn test_bare_minimum_funcdef() {
        parse_module("def f(): ...", ParseOptions::default()).expect("parse error");
    }

    #[test]
    fn test_single_statement_with_no_newline() {
        for src in &[
            "del _",
            "if _:\n    '''\n)'''",
            "if _:\n    ('''\n''')",
            "x = (\n  1,\n)",
        ] {
            let tree = parse_module(src, ParseOptions::default())
                .unwrap_or_else(|e| panic!("'{}' doesn't parse: {}", src, e));
            assert_eq!(tree.text(tree.root()), *src);
        }
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let tree = parse_module("\u{feff}x = 1\n", ParseOptions::default()).unwrap();
        assert_eq!(tree.text(tree.root()), "x = 1\n");
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = parse_module("x = 1\ndef\n", ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParserError::SyntaxError { .. }));
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_prettify_error_shows_label_and_line() {
        let source = "x = 1\ny = (\n";
        let err = parse_module(source, ParseOptions::default()).unwrap_err();
        let formatted = prettify_error(&err, source, "broken.py");
        assert!(formatted.contains("broken.py"));
    }

    #[test]
    fn test_prettify_build_error() {
        let source = "f(x for x in y, 1)\n";
        let err = parse_module(source, ParseOptions::default()).unwrap_err();
        let formatted = prettify_error(&err, source, "gen.py");
        assert!(formatted.contains("Generator expression must be parenthesized"));
        assert!(formatted.contains("f(x for x in y, 1)"));
    }

    #[test]
    fn test_parse_raw_exposes_rules() {
        let raw = parse_raw("a + b\n", ParseOptions::default()).unwrap();
        assert_eq!(raw.rule(raw.root()), Some(Rule::FileInput));
    }
}
