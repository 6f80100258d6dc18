// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The tokenizer state machine.
//!
//! [`TokState`] walks the source once, left to right, and produces the full
//! token stream including the synthetic `NEWLINE`, `INDENT`, `DEDENT` and
//! `ENDMARKER` tokens. Blank lines and comment-only lines never produce
//! tokens: their text ends up in the prefix of the next real token and
//! their comments in its trivia.
//!
//! Inside brackets, newlines are insignificant (implicit line joining). A
//! backslash immediately followed by a newline joins lines explicitly.

use std::mem;
use std::sync::LazyLock;

use memchr::{memchr2, memchr3, memchr_iter, memrchr};
use regex::Regex;
use thiserror::Error;
use tuglint_core::{Position, Span, TextRange};

use super::token::{Keyword, Punct, TokType, Token, Trivia};

/// Columns per tab stop when measuring indentation.
const TAB_SIZE: usize = 8;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^(?:
            0[xX](?:_?[0-9a-fA-F])+
          | 0[bB](?:_?[01])+
          | 0[oO](?:_?[0-7])+
          | (?:
                [0-9](?:_?[0-9])*(?:\.(?:[0-9](?:_?[0-9])*)?)?
              | \.[0-9](?:_?[0-9])*
            )
            (?:[eE][+-]?[0-9](?:_?[0-9])*)?
            [jJ]?
        )",
    )
    .expect("number pattern is valid")
});

/// Valid string prefixes, lowercased.
const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

// ============================================================================
// Errors
// ============================================================================

/// What went wrong while tokenizing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated triple-quoted string literal")]
    UnterminatedTripleQuotedString,
    #[error("unindent does not match any outer indentation level")]
    Dedent,
    #[error("invalid character '{0}'")]
    BadCharacter(char),
    #[error("unexpected character after line continuation character")]
    LineContinuation,
    #[error("closing '{0}' does not match any opening bracket")]
    UnmatchedBracket(char),
    #[error("'{0}' was never closed")]
    UnclosedBracket(char),
}

/// A tokenizer error with its location.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} (line {}, column {})", .position.line, .position.column)]
pub struct TokError {
    pub kind: TokErrorKind,
    pub position: Position,
    /// Byte offset of the error.
    pub offset: usize,
}

// ============================================================================
// State machine
// ============================================================================

/// Tokenizer state for a single source text.
pub struct TokState<'t> {
    text: &'t str,
    pos: usize,
    line: u32,
    line_start: usize,
    indent_stack: Vec<usize>,
    /// Open brackets with their offsets.
    brackets: Vec<(char, usize)>,
    at_line_start: bool,
    prefix_start: usize,
    pending_trivia: Vec<Trivia>,
    tokens: Vec<Token>,
}

impl<'t> TokState<'t> {
    pub fn new(text: &'t str) -> Self {
        TokState {
            text,
            pos: 0,
            line: 1,
            line_start: 0,
            indent_stack: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
            prefix_start: 0,
            pending_trivia: Vec::new(),
            tokens: Vec::new(),
        }
    }

    /// Consume the state and produce the whole token stream.
    pub fn tokenize(mut self) -> Result<Vec<Token>, TokError> {
        loop {
            if self.at_line_start && self.brackets.is_empty() && !self.start_logical_line()? {
                break;
            }
            self.skip_inline_whitespace();
            let Some(c) = self.peek() else { break };
            match c {
                '#' => self.read_comment(),
                '\\' => self.read_continuation()?,
                '\n' | '\r' => {
                    let len = self.newline_len(self.pos);
                    let start = self.pos;
                    if self.brackets.is_empty() {
                        self.push_token(TokType::Newline, start, start + len);
                        if len == 1 && c == '\r' {
                            self.advance_line(start + len);
                        }
                        self.at_line_start = true;
                    } else {
                        self.pos += len;
                        self.advance_line(self.pos);
                    }
                }
                _ => self.read_token(c)?,
            }
        }
        self.finish()
    }

    // ------------------------------------------------------------------------
    // Lines and indentation
    // ------------------------------------------------------------------------

    /// Skip blank and comment-only lines, then emit INDENT/DEDENT tokens for
    /// the first line with content. Returns false at end of input.
    fn start_logical_line(&mut self) -> Result<bool, TokError> {
        let bytes = self.text.as_bytes();
        loop {
            let mut column = 0usize;
            let mut p = self.pos;
            while let Some(&b) = bytes.get(p) {
                match b {
                    b' ' => column += 1,
                    b'\t' => column = (column / TAB_SIZE + 1) * TAB_SIZE,
                    b'\x0c' => column = 0,
                    _ => break,
                }
                p += 1;
            }
            self.pos = p;
            match bytes.get(p) {
                None => return Ok(false),
                Some(b'#') => {
                    self.read_comment();
                    if self.pos >= bytes.len() {
                        return Ok(false);
                    }
                    let len = self.newline_len(self.pos);
                    self.pos += len;
                    self.advance_line(self.pos);
                }
                Some(b'\n') | Some(b'\r') => {
                    let len = self.newline_len(p);
                    self.pos = p + len;
                    self.advance_line(self.pos);
                }
                Some(_) => {
                    self.at_line_start = false;
                    self.emit_indentation(column)?;
                    return Ok(true);
                }
            }
        }
    }

    fn emit_indentation(&mut self, column: usize) -> Result<(), TokError> {
        let current = self.indent_stack.last().copied().unwrap_or(0);
        if column > current {
            self.indent_stack.push(column);
            self.push_virtual(TokType::Indent);
        } else if column < current {
            while self.indent_stack.last().is_some_and(|&top| column < top) {
                self.indent_stack.pop();
                self.push_virtual(TokType::Dedent);
            }
            if self.indent_stack.last() != Some(&column) {
                return Err(self.error(TokErrorKind::Dedent, self.pos));
            }
        }
        Ok(())
    }

    fn advance_line(&mut self, next_line_start: usize) {
        self.line += 1;
        self.line_start = next_line_start;
    }

    fn newline_len(&self, at: usize) -> usize {
        if self.text.as_bytes().get(at..at + 2) == Some(&b"\r\n"[..]) {
            2
        } else {
            1
        }
    }

    // ------------------------------------------------------------------------
    // Whitespace, comments, continuations
    // ------------------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_inline_whitespace(&mut self) {
        let bytes = self.text.as_bytes();
        while matches!(bytes.get(self.pos), Some(b' ' | b'\t' | b'\x0c')) {
            self.pos += 1;
        }
    }

    fn read_comment(&mut self) {
        let start = self.pos;
        let end = memchr2(b'\n', b'\r', &self.text.as_bytes()[start..])
            .map_or(self.text.len(), |i| start + i);
        let range = TextRange::new(
            self.position_at(start),
            self.position_at(end),
            Span::from_offsets(start, end),
        );
        self.pending_trivia.push(Trivia {
            value: self.text[start..end].to_string(),
            range,
        });
        self.pos = end;
    }

    fn read_continuation(&mut self) -> Result<(), TokError> {
        let after = self.pos + 1;
        match self.text.as_bytes().get(after) {
            Some(b'\n') | Some(b'\r') => {
                self.pos = after + self.newline_len(after);
                self.advance_line(self.pos);
                Ok(())
            }
            _ => Err(self.error(TokErrorKind::LineContinuation, self.pos)),
        }
    }

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------

    fn read_token(&mut self, c: char) -> Result<(), TokError> {
        let start = self.pos;
        if c.is_alphabetic() || c == '_' {
            let end = self.identifier_end(start);
            let word = &self.text[start..end];
            if matches!(self.text.as_bytes().get(end), Some(b'\'' | b'"'))
                && STRING_PREFIXES.contains(&word.to_ascii_lowercase().as_str())
            {
                let string_end = self.scan_string(start, end)?;
                self.push_token(TokType::String, start, string_end);
            } else {
                let kind = Keyword::from_text(word).map_or(TokType::Name, TokType::Keyword);
                self.push_token(kind, start, end);
            }
            return Ok(());
        }
        if c == '"' || c == '\'' {
            let end = self.scan_string(start, start)?;
            self.push_token(TokType::String, start, end);
            return Ok(());
        }
        if c.is_ascii_digit() || (c == '.' && self.next_is_digit(start + 1)) {
            if let Some(m) = NUMBER.find(&self.text[start..]) {
                self.push_token(TokType::Number, start, start + m.end());
                return Ok(());
            }
        }
        for len in [3, 2, 1] {
            let Some(text) = self.text.get(start..start + len) else {
                continue;
            };
            if let Some(punct) = Punct::from_text(text) {
                self.track_bracket(punct, start)?;
                self.push_token(TokType::Punct(punct), start, start + len);
                return Ok(());
            }
        }
        Err(self.error(TokErrorKind::BadCharacter(c), start))
    }

    fn identifier_end(&self, start: usize) -> usize {
        self.text[start..]
            .char_indices()
            .find(|&(_, ch)| !(ch.is_alphanumeric() || ch == '_'))
            .map_or(self.text.len(), |(i, _)| start + i)
    }

    fn next_is_digit(&self, at: usize) -> bool {
        self.text.as_bytes().get(at).is_some_and(u8::is_ascii_digit)
    }

    /// Scan a string literal whose opening quote is at `quote`. Returns the
    /// offset just past the closing quote.
    fn scan_string(&self, start: usize, quote: usize) -> Result<usize, TokError> {
        let bytes = self.text.as_bytes();
        let q = bytes[quote];
        let triple = bytes.get(quote + 1..quote + 3) == Some(&[q, q][..]);
        let mut p = quote + if triple { 3 } else { 1 };
        let unterminated = if triple {
            TokErrorKind::UnterminatedTripleQuotedString
        } else {
            TokErrorKind::UnterminatedString
        };
        loop {
            let rest = bytes.get(p..).unwrap_or_default();
            let found = if triple {
                memchr2(q, b'\\', rest)
            } else {
                memchr3(q, b'\\', b'\n', rest)
            };
            let Some(i) = found else {
                return Err(self.error(unterminated, start));
            };
            let at = p + i;
            match bytes[at] {
                b'\\' => {
                    if at + 1 >= bytes.len() {
                        return Err(self.error(unterminated, start));
                    }
                    p = at + 2;
                }
                b'\n' => return Err(self.error(unterminated, start)),
                _ if !triple => return Ok(at + 1),
                _ if bytes.get(at..at + 3) == Some(&[q, q, q][..]) => return Ok(at + 3),
                _ => p = at + 1,
            }
        }
    }

    fn track_bracket(&mut self, punct: Punct, at: usize) -> Result<(), TokError> {
        let ch = punct.as_str().chars().next().unwrap_or_default();
        if punct.is_open_bracket() {
            self.brackets.push((ch, at));
        } else if punct.is_close_bracket() {
            let expected = match punct {
                Punct::RightParen => '(',
                Punct::RightBracket => '[',
                _ => '{',
            };
            match self.brackets.pop() {
                Some((open, _)) if open == expected => {}
                _ => return Err(self.error(TokErrorKind::UnmatchedBracket(ch), at)),
            }
        }
        Ok(())
    }

    fn position_at(&self, offset: usize) -> Position {
        let column = self.text[self.line_start..offset].chars().count();
        Position::new(self.line, column as u32)
    }

    fn push_token(&mut self, kind: TokType, start: usize, end: usize) {
        let start_position = self.position_at(start);
        let value = &self.text[start..end];
        let bytes = value.as_bytes();
        let newlines = memchr_iter(b'\n', bytes).count();
        if let Some(last) = memrchr(b'\n', bytes) {
            self.line += newlines as u32;
            self.line_start = start + last + 1;
        }
        let end_position = self.position_at(end);
        self.tokens.push(Token {
            kind,
            value: value.to_string(),
            prefix: self.text[self.prefix_start..start].to_string(),
            span: Span::from_offsets(start, end),
            start: start_position,
            end: end_position,
            trivia: mem::take(&mut self.pending_trivia),
        });
        self.prefix_start = end;
        self.pos = end;
    }

    fn push_virtual(&mut self, kind: TokType) {
        let position = self.position_at(self.pos);
        self.tokens.push(Token {
            kind,
            value: String::new(),
            prefix: String::new(),
            span: Span::empty_at(self.pos),
            start: position,
            end: position,
            trivia: Vec::new(),
        });
    }

    fn finish(mut self) -> Result<Vec<Token>, TokError> {
        if let Some(&(open, at)) = self.brackets.last() {
            return Err(self.error(TokErrorKind::UnclosedBracket(open), at));
        }
        let needs_newline = self
            .tokens
            .iter()
            .rev()
            .find(|t| !t.is_virtual())
            .is_some_and(|t| t.kind != TokType::Newline);
        self.pos = self.text.len();
        if needs_newline {
            let end = self.pos;
            self.push_token(TokType::Newline, end, end);
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push_virtual(TokType::Dedent);
        }
        let end = self.pos;
        self.push_token(TokType::EndMarker, end, end);
        Ok(self.tokens)
    }

    fn error(&self, kind: TokErrorKind, offset: usize) -> TokError {
        let offset = offset.min(self.text.len());
        // Errors may point before the current line start (unterminated strings).
        let line_start = self.text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line = self.text[..line_start].matches('\n').count() as u32 + 1;
        let column = self.text[line_start..offset].chars().count() as u32;
        TokError {
            kind,
            position: Position::new(line, column),
            offset,
        }
    }
}
