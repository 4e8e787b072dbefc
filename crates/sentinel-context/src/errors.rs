//! Error types for context resolution and limits loading.

use std::path::PathBuf;

use thiserror::Error;

/// A reference that cannot be admitted into an Allowed Context list.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// Empty, malformed, or root-escaping reference.
    #[error("invalid reference '{raw}': {reason}")]
    InvalidReference {
        /// The reference as written by the caller.
        raw: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Normalized reference (or its glob base) is not on disk.
    #[error("reference does not exist: {path}")]
    MissingReference {
        /// The normalized reference.
        path: String,
    },
}

impl ReferenceError {
    pub(crate) fn invalid(raw: &str, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidReference { .. } => "INVALID_REFERENCE",
            Self::MissingReference { .. } => "MISSING_REFERENCE",
        }
    }
}

/// Failures while loading the limits configuration.
#[derive(Debug, Error)]
pub enum LimitsError {
    /// Config or schema file could not be read.
    #[error("unable to read '{path}': {source}")]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config or schema text is not valid JSON/YAML, or has the wrong shape.
    #[error("failed to parse '{path}': {message}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The schema itself does not compile.
    #[error("limits schema '{source_name}' is invalid: {message}")]
    SchemaInvalid {
        /// Schema path, or `<embedded>`.
        source_name: String,
        /// Compiler message.
        message: String,
    },

    /// Config does not satisfy the schema. One violation per line.
    #[error("limits config failed schema validation ({path}):\n{message}")]
    Validation {
        /// Config file.
        path: PathBuf,
        /// `<instance path> -> <message>` lines.
        message: String,
    },

    /// `warningThreshold` outside `(0, 1]`.
    #[error("warningThreshold must be greater than 0 and at most 1 (got {0})")]
    Threshold(f64),
}

impl LimitsError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "CONTEXT_LIMITS_READ",
            Self::Parse { .. } => "CONTEXT_LIMITS_PARSE",
            Self::SchemaInvalid { .. } => "CONTEXT_LIMITS_SCHEMA",
            Self::Validation { .. } => "CONTEXT_LIMITS_VALIDATE",
            Self::Threshold(_) => "CONTEXT_LIMITS_THRESHOLD",
        }
    }
}

/// Top-level error for this crate.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Reference rejected.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// Limits configuration rejected.
    #[error(transparent)]
    Limits(#[from] LimitsError),
}

impl ContextError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Reference(e) => e.code(),
            Self::Limits(e) => e.code(),
        }
    }
}

/// Result type for context operations.
pub type Result<T> = std::result::Result<T, ContextError>;
