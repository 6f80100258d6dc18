// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Token types.
//!
//! A [`Token`] is immutable once the tokenizer returns it. Besides its own
//! text, every real token carries its *prefix*: the exact source between the
//! end of the previous real token and its own start (whitespace, comments,
//! blank lines, line continuations). Concatenating `prefix + value` for a
//! run of consecutive tokens therefore reproduces the source they cover.
//!
//! `INDENT` and `DEDENT` are virtual: they have an empty value and an empty
//! prefix, so they never contribute text.

use std::fmt;

use tuglint_core::{Position, Span, TextRange};

/// Generates a fieldless enum of fixed-text tokens together with its text
/// lookups.
macro_rules! fixed_tokens {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => $text:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $variant ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),*];

            /// The source text of this token.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),*
                }
            }

            /// Look up a variant by its source text.
            pub fn from_text(text: &str) -> Option<Self> {
                match text {
                    $( $text => Some($name::$variant), )*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

fixed_tokens! {
    /// Reserved words.
    ///
    /// `async` and `await` are not reserved here: they are tokenized as names
    /// and recognized by the grammar from their position.
    pub enum Keyword {
        False => "False",
        None => "None",
        True => "True",
        And => "and",
        As => "as",
        Assert => "assert",
        Break => "break",
        Class => "class",
        Continue => "continue",
        Def => "def",
        Del => "del",
        Elif => "elif",
        Else => "else",
        Except => "except",
        Finally => "finally",
        For => "for",
        From => "from",
        Global => "global",
        If => "if",
        Import => "import",
        In => "in",
        Is => "is",
        Lambda => "lambda",
        Nonlocal => "nonlocal",
        Not => "not",
        Or => "or",
        Pass => "pass",
        Raise => "raise",
        Return => "return",
        Try => "try",
        While => "while",
        With => "with",
        Yield => "yield",
    }
}

fixed_tokens! {
    /// Operators and delimiters.
    pub enum Punct {
        Ellipsis => "...",
        DoubleStarEqual => "**=",
        DoubleSlashEqual => "//=",
        LeftShiftEqual => "<<=",
        RightShiftEqual => ">>=",
        Arrow => "->",
        ColonEqual => ":=",
        DoubleStar => "**",
        DoubleSlash => "//",
        LeftShift => "<<",
        RightShift => ">>",
        LessEqual => "<=",
        GreaterEqual => ">=",
        EqualEqual => "==",
        NotEqual => "!=",
        PlusEqual => "+=",
        MinusEqual => "-=",
        StarEqual => "*=",
        SlashEqual => "/=",
        PercentEqual => "%=",
        AtEqual => "@=",
        AmperEqual => "&=",
        VbarEqual => "|=",
        CircumflexEqual => "^=",
        Plus => "+",
        Minus => "-",
        Star => "*",
        Slash => "/",
        Percent => "%",
        At => "@",
        Amper => "&",
        Vbar => "|",
        Circumflex => "^",
        Tilde => "~",
        Less => "<",
        Greater => ">",
        LeftParen => "(",
        RightParen => ")",
        LeftBracket => "[",
        RightBracket => "]",
        LeftBrace => "{",
        RightBrace => "}",
        Comma => ",",
        Colon => ":",
        Dot => ".",
        Semicolon => ";",
        Equal => "=",
    }
}

impl Punct {
    /// Whether this is an augmented assignment operator such as `+=`.
    pub fn is_augmented_assign(self) -> bool {
        matches!(
            self,
            Punct::PlusEqual
                | Punct::MinusEqual
                | Punct::StarEqual
                | Punct::SlashEqual
                | Punct::DoubleSlashEqual
                | Punct::PercentEqual
                | Punct::AtEqual
                | Punct::AmperEqual
                | Punct::VbarEqual
                | Punct::CircumflexEqual
                | Punct::LeftShiftEqual
                | Punct::RightShiftEqual
                | Punct::DoubleStarEqual
        )
    }

    /// Whether this punctuator opens a bracket.
    pub fn is_open_bracket(self) -> bool {
        matches!(self, Punct::LeftParen | Punct::LeftBracket | Punct::LeftBrace)
    }

    /// Whether this punctuator closes a bracket.
    pub fn is_close_bracket(self) -> bool {
        matches!(
            self,
            Punct::RightParen | Punct::RightBracket | Punct::RightBrace
        )
    }
}

/// The category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokType {
    Keyword(Keyword),
    Punct(Punct),
    Name,
    Number,
    String,
    Newline,
    Indent,
    Dedent,
    EndMarker,
}

impl TokType {
    /// A short description used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokType::Keyword(k) => k.as_str(),
            TokType::Punct(p) => p.as_str(),
            TokType::Name => "NAME",
            TokType::Number => "NUMBER",
            TokType::String => "STRING",
            TokType::Newline => "NEWLINE",
            TokType::Indent => "INDENT",
            TokType::Dedent => "DEDENT",
            TokType::EndMarker => "ENDMARKER",
        }
    }
}

impl fmt::Display for TokType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A comment found in a token's prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    /// The comment text, including the leading `#`.
    pub value: String,
    pub range: TextRange,
}

/// A lexical unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokType,
    pub value: String,
    /// Source text between the previous real token and this one.
    pub prefix: String,
    pub span: Span,
    pub start: Position,
    pub end: Position,
    /// Comments contained in `prefix`, in source order.
    pub trivia: Vec<Trivia>,
}

impl Token {
    /// Whether the token is an `INDENT` or `DEDENT`.
    pub fn is_virtual(&self) -> bool {
        matches!(self.kind, TokType::Indent | TokType::Dedent)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokType::Keyword(keyword)
    }

    pub fn is_punct(&self, punct: Punct) -> bool {
        self.kind == TokType::Punct(punct)
    }

    /// 1-based line of the first character.
    pub fn line(&self) -> u32 {
        self.start.line
    }

    /// 0-based column of the first character.
    pub fn column(&self) -> u32 {
        self.start.column
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start, self.end, self.span)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokType::Name | TokType::Number | TokType::String => {
                write!(f, "{} '{}'", self.kind, self.value)
            }
            TokType::Keyword(_) | TokType::Punct(_) => write!(f, "'{}'", self.value),
            _ => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(Keyword::from_text("lambda"), Some(Keyword::Lambda));
        assert_eq!(Keyword::from_text("async"), None);
        assert_eq!(Keyword::None.as_str(), "None");
        assert_eq!(Keyword::ALL.len(), 33);
    }

    #[test]
    fn test_punct_lookup() {
        assert_eq!(Punct::from_text("->"), Some(Punct::Arrow));
        assert_eq!(Punct::from_text("**="), Some(Punct::DoubleStarEqual));
        assert_eq!(Punct::from_text("<>"), None);
        assert!(Punct::DoubleSlashEqual.is_augmented_assign());
        assert!(!Punct::EqualEqual.is_augmented_assign());
        assert!(Punct::LeftBrace.is_open_bracket());
        assert!(Punct::RightBracket.is_close_bracket());
    }
}
