// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Python version abstraction for version-aware parsing.
//!
//! This module provides [`PythonVersion`] and [`ParseOptions`]. In
//! [`PythonVersion::Permissive`] mode the parser accepts everything the
//! grammar handles. A concrete version rejects syntax introduced after it:
//! assignment expressions (`:=`) and positional-only parameter markers
//! (`/`) need 3.8.

use serde::{Deserialize, Serialize};

/// Target Python language version for parsing.
///
/// # Example
///
/// ```
/// use tuglint_python_cst::{parse_module, ParseOptions, PythonVersion};
///
/// // Permissive mode accepts all syntax.
/// assert!(parse_module("(y := 1)", ParseOptions::default()).is_ok());
///
/// // Python 3.7 predates the walrus operator.
/// let options = ParseOptions::new(PythonVersion::V3_7);
/// assert!(parse_module("(y := 1)", options).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PythonVersion {
    /// Accept all syntax the grammar handles; no version validation.
    #[default]
    Permissive,

    /// A specific target language version (e.g., 3.8).
    V {
        /// Major version number (always 3 for supported versions).
        major: u8,
        /// Minor version number.
        minor: u8,
    },
}

impl PythonVersion {
    /// Python 3.7 - async and await become reserved.
    pub const V3_7: Self = Self::V { major: 3, minor: 7 };

    /// Python 3.8 - walrus operator and positional-only parameters.
    pub const V3_8: Self = Self::V { major: 3, minor: 8 };

    /// Python 3.9 - relaxed decorator syntax.
    pub const V3_9: Self = Self::V { major: 3, minor: 9 };

    fn at_least(self, minor_required: u8) -> bool {
        match self {
            Self::Permissive => true,
            Self::V { major: 3, minor } => minor >= minor_required,
            Self::V { major, .. } => major > 3,
        }
    }

    /// Returns whether assignment expressions (`:=`) are available.
    #[must_use]
    pub fn has_walrus(self) -> bool {
        self.at_least(8)
    }

    /// Returns whether the positional-only parameter marker (`/`) is available.
    #[must_use]
    pub fn has_positional_only_params(self) -> bool {
        self.at_least(8)
    }

    /// Returns whether `async` and `await` are reserved words.
    ///
    /// The grammar recognizes them by position in every version; this is
    /// informational for rules.
    #[must_use]
    pub fn has_async_keywords(self) -> bool {
        self.at_least(7)
    }

    /// Returns whether this is the permissive mode.
    #[must_use]
    pub fn is_permissive(self) -> bool {
        matches!(self, Self::Permissive)
    }

    /// Returns the major and minor version numbers, if this is a specific version.
    #[must_use]
    pub fn version_tuple(self) -> Option<(u8, u8)> {
        match self {
            Self::Permissive => None,
            Self::V { major, minor } => Some((major, minor)),
        }
    }
}

impl std::fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permissive => write!(f, "permissive"),
            Self::V { major, minor } => write!(f, "{}.{}", major, minor),
        }
    }
}

/// Configuration options for parsing Python source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Target Python version for parsing.
    #[serde(default)]
    pub version: PythonVersion,
}

impl ParseOptions {
    /// Creates parse options targeting a specific Python version.
    #[must_use]
    pub fn new(version: PythonVersion) -> Self {
        Self { version }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_accepts_everything() {
        let v = PythonVersion::Permissive;
        assert!(v.is_permissive());
        assert!(v.has_walrus());
        assert!(v.has_positional_only_params());
        assert!(v.has_async_keywords());
        assert_eq!(v.version_tuple(), None);
    }

    #[test]
    fn test_version_feature_queries() {
        assert!(!PythonVersion::V3_7.has_walrus());
        assert!(!PythonVersion::V3_7.has_positional_only_params());
        assert!(PythonVersion::V3_7.has_async_keywords());
        assert!(PythonVersion::V3_8.has_walrus());
        assert!(PythonVersion::V3_9.has_positional_only_params());
        assert!(!PythonVersion::V { major: 3, minor: 6 }.has_async_keywords());
    }

    #[test]
    fn test_version_display() {
        assert_eq!(PythonVersion::Permissive.to_string(), "permissive");
        assert_eq!(PythonVersion::V3_8.to_string(), "3.8");
    }

    #[test]
    fn test_parse_options_default() {
        assert_eq!(ParseOptions::default().version, PythonVersion::Permissive);
        assert_eq!(
            ParseOptions::new(PythonVersion::V3_9).version,
            PythonVersion::V3_9
        );
    }

    #[test]
    fn test_parse_options_deserialize() {
        let options: ParseOptions =
            serde_json::from_str(r#"{"version": {"v": {"major": 3, "minor": 8}}}"#).unwrap();
        assert_eq!(options.version, PythonVersion::V3_8);
        let options: ParseOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.version, PythonVersion::Permissive);
    }
}
