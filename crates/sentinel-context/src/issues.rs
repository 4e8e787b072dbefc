//! Lint issue vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Issue severity. Errors always fail a lint run; warnings only in strict mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Near-limit or duplicate entry.
    Warning,
    /// Budget exceeded or invalid reference.
    Error,
}

impl Severity {
    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable issue codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// Line count above budget.
    MaxLines,
    /// Line count at or above the warning fraction of the budget.
    NearLimit,
    /// Enforced file without a non-empty `Allowed Context` section.
    MissingAllowedContext,
    /// Entry failed normalization.
    InvalidInclude,
    /// Entry does not exist on disk.
    MissingInclude,
    /// Entry falls under a forbidden prefix.
    ForbiddenInclude,
    /// Entry repeated within one file.
    DuplicateInclude,
    /// File could not be read.
    ReadError,
}

impl IssueCode {
    /// Wire form, e.g. `MAX_LINES`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MaxLines => "MAX_LINES",
            Self::NearLimit => "NEAR_LIMIT",
            Self::MissingAllowedContext => "MISSING_ALLOWED_CONTEXT",
            Self::InvalidInclude => "INVALID_INCLUDE",
            Self::MissingInclude => "MISSING_INCLUDE",
            Self::ForbiddenInclude => "FORBIDDEN_INCLUDE",
            Self::DuplicateInclude => "DUPLICATE_INCLUDE",
            Self::ReadError => "READ_ERROR",
        }
    }

    /// Severity every issue with this code carries.
    pub fn severity(self) -> Severity {
        match self {
            Self::NearLimit | Self::DuplicateInclude => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding against one file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Root-relative path of the offending file.
    pub file: String,
    /// What went wrong.
    pub code: IssueCode,
    /// Derived from `code`.
    pub severity: Severity,
    /// Human-readable detail.
    pub message: String,
}

impl Issue {
    /// Build an issue; severity follows from `code`.
    pub fn new(file: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            code,
            severity: code.severity(),
            message: message.into(),
        }
    }

    /// Whether this issue is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.severity {
            Severity::Error => 'X',
            Severity::Warning => '!',
        };
        write!(f, "{marker} [{}] {} -> {}", self.code, self.file, self.message)
    }
}
