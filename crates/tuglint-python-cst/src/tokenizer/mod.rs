// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tokenizer for Python source code.

pub(crate) mod core;
mod token;

#[cfg(test)]
mod tests;

pub use self::core::{TokError, TokErrorKind, TokState};
pub use self::token::{Keyword, Punct, TokType, Token, Trivia};
