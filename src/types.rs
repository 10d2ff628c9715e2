//! Diagnostic value types shared by every rule and every consumer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a reported diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Closed set of issue kinds the engine can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    MissingDoctype,
    UnmatchedQuote,
    VoidElementMisuse,
    UnexpectedClosing,
    MismatchedClosing,
    UnclosedTag,
    TagTypo,
    MalformedTag,
    InvalidNestedAngle,
    DuplicateId,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::MissingDoctype,
        Category::UnmatchedQuote,
        Category::VoidElementMisuse,
        Category::UnexpectedClosing,
        Category::MismatchedClosing,
        Category::UnclosedTag,
        Category::TagTypo,
        Category::MalformedTag,
        Category::InvalidNestedAngle,
        Category::DuplicateId,
    ];

    /// The kebab-case identifier used in output and inline directives
    pub fn as_str(self) -> &'static str {
        match self {
            Category::MissingDoctype => "missing-doctype",
            Category::UnmatchedQuote => "unmatched-quote",
            Category::VoidElementMisuse => "void-element-misuse",
            Category::UnexpectedClosing => "unexpected-closing",
            Category::MismatchedClosing => "mismatched-closing",
            Category::UnclosedTag => "unclosed-tag",
            Category::TagTypo => "tag-typo",
            Category::MalformedTag => "malformed-tag",
            Category::InvalidNestedAngle => "invalid-nested-angle",
            Category::DuplicateId => "duplicate-id",
        }
    }

    /// Severity a diagnostic of this category is reported with
    pub fn default_severity(self) -> Severity {
        match self {
            Category::MissingDoctype | Category::DuplicateId => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// True syntax errors that an editor shows as a blocking banner and a
    /// submission gate may refuse to accept.
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            Category::MalformedTag
                | Category::UnclosedTag
                | Category::InvalidNestedAngle
                | Category::UnmatchedQuote
                | Category::VoidElementMisuse
        )
    }

    /// Code of the rule that emits this category
    pub fn rule_code(self) -> &'static str {
        match self {
            Category::MissingDoctype => "HT001",
            Category::UnexpectedClosing
            | Category::MismatchedClosing
            | Category::UnclosedTag
            | Category::VoidElementMisuse => "HT002",
            Category::MalformedTag => "HT003",
            Category::InvalidNestedAngle => "HT004",
            Category::UnmatchedQuote => "HT005",
            Category::TagTypo => "HT006",
            Category::DuplicateId => "HT007",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("Unknown diagnostic category: {s}"))
    }
}

/// One reported issue
///
/// `line` and `column` are 1-based; `column` counts characters from the start
/// of the line. `length` is the number of characters the issue spans, or 0
/// when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub length: usize,
    pub message: String,
    pub severity: Severity,
    pub category: Category,
}

impl Diagnostic {
    /// Build a diagnostic carrying the category's default severity
    pub fn new(category: Category, line: usize, column: usize, length: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            length,
            message: message.into(),
            severity: category.default_severity(),
            category,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Code of the rule this diagnostic came from
    pub fn rule_code(&self) -> &'static str {
        self.category.rule_code()
    }
}
