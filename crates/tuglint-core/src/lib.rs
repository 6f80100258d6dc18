//! Core vocabulary shared by the tuglint crates.
//!
//! This crate holds the small set of types that every stage of the analysis
//! pipeline agrees on:
//!
//! - [`span`]: byte spans and line/column positions into a source file
//! - [`issue`]: diagnostics produced by rule consumers
//! - [`error`]: the unified [`TuglintError`] and its stable output codes

pub mod error;
pub mod issue;
pub mod span;

pub use error::{OutputErrorCode, TuglintError, TuglintResult};
pub use issue::{Issue, IssueLocation, SecondaryLocation};
pub use span::{Position, Span, TextRange};
