// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Grammar, raw parse tree and parser errors.

mod errors;
mod grammar;
pub mod raw;

pub use errors::{BuildError, ParserError, Result};
pub use raw::{RawId, RawKind, RawTree, Rule};

use tracing::trace;

use crate::tokenizer::Token;
use crate::version::PythonVersion;
use grammar::{python, Tok};

/// Parse a token stream into a raw tree.
pub fn parse_tokens(tokens: Vec<Token>, version: PythonVersion) -> Result<RawTree> {
    let toks: Vec<Tok> = tokens
        .iter()
        .enumerate()
        .map(|(index, token)| Tok::new(index, token))
        .collect();
    match python::file_input(&toks, version) {
        Ok(parsed) => {
            trace!(tokens = tokens.len(), "parsed token stream");
            Ok(RawTree::new(parsed, tokens))
        }
        Err(err) => {
            let index = err.location.min(tokens.len().saturating_sub(1));
            let expected = sorted_expected(err.expected.tokens());
            Err(match tokens.get(index) {
                Some(token) => ParserError::SyntaxError {
                    found: token.to_string(),
                    expected,
                    position: token.start,
                    range: token.span.range(),
                },
                None => ParserError::SyntaxError {
                    found: "end of input".to_string(),
                    expected,
                    position: tuglint_core::Position::new(1, 0),
                    range: 0..0,
                },
            })
        }
    }
}

/// Deduplicate and sort the expected-token set for a stable message.
fn sorted_expected<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    let mut expected: Vec<&str> = tokens.collect();
    expected.sort_unstable();
    expected.dedup();
    expected.join(", ")
}
