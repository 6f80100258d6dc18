//! Diagnostics produced by rule consumers.
//!
//! An [`Issue`] has exactly one primary location, a message, and zero or more
//! secondary locations. The primary location is either a precise source
//! range, a bare line, or the whole file.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::TextRange;

/// Where an issue is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueLocation {
    /// A precise range, from the first character of one token to the last
    /// character of another.
    Precise { range: TextRange },
    /// A whole line, with no node context.
    Line { line: u32 },
    /// The file as a whole.
    File,
}

impl IssueLocation {
    /// The line the location starts on, if it has one.
    pub fn line(&self) -> Option<u32> {
        match self {
            IssueLocation::Precise { range } => Some(range.start.line),
            IssueLocation::Line { line } => Some(*line),
            IssueLocation::File => None,
        }
    }
}

impl fmt::Display for IssueLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueLocation::Precise { range } => write!(f, "{}", range),
            IssueLocation::Line { line } => write!(f, "line {}", line),
            IssueLocation::File => write!(f, "file"),
        }
    }
}

/// An additional location that explains the primary one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryLocation {
    pub range: TextRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub primary: IssueLocation,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<SecondaryLocation>,
}

impl Issue {
    pub fn new(primary: IssueLocation, message: impl Into<String>) -> Self {
        Issue {
            primary,
            message: message.into(),
            secondary: Vec::new(),
        }
    }

    /// Create an issue on a precise source range.
    pub fn precise(range: TextRange, message: impl Into<String>) -> Self {
        Self::new(IssueLocation::Precise { range }, message)
    }

    /// Create an issue on a whole line.
    pub fn line(line: u32, message: impl Into<String>) -> Self {
        Self::new(IssueLocation::Line { line }, message)
    }

    /// Create an issue on the file.
    pub fn file(message: impl Into<String>) -> Self {
        Self::new(IssueLocation::File, message)
    }

    /// Append a secondary location.
    pub fn with_secondary(mut self, range: TextRange, message: Option<String>) -> Self {
        self.secondary.push(SecondaryLocation { range, message });
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.primary, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{Position, Span};

    fn range() -> TextRange {
        TextRange::new(Position::new(3, 4), Position::new(3, 9), Span::new(20, 25))
    }

    #[test]
    fn test_issue_lines() {
        assert_eq!(Issue::precise(range(), "m").primary.line(), Some(3));
        assert_eq!(Issue::line(7, "m").primary.line(), Some(7));
        assert_eq!(Issue::file("m").primary.line(), None);
    }

    #[test]
    fn test_issue_serializes_with_tagged_location() {
        let issue = Issue::precise(range(), "Remove this").with_secondary(range(), None);
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["primary"]["kind"], "precise");
        assert_eq!(json["primary"]["range"]["start"]["line"], 3);
        assert_eq!(json["message"], "Remove this");
        assert_eq!(json["secondary"].as_array().unwrap().len(), 1);
        assert!(json["secondary"][0].get("message").is_none());

        let file = serde_json::to_value(Issue::file("whole file")).unwrap();
        assert_eq!(file["primary"]["kind"], "file");
        assert!(file.get("secondary").is_none());
    }

    #[test]
    fn test_issue_display() {
        assert_eq!(Issue::line(2, "too long").to_string(), "line 2: too long");
    }
}
