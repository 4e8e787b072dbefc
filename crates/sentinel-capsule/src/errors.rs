//! Capsule generation errors. All of them are fatal.

use std::path::PathBuf;

use sentinel_context::ReferenceError;
use thiserror::Error;

/// Why a capsule could not be produced.
#[derive(Debug, Error)]
pub enum CapsuleError {
    /// Spec directory does not exist or is not a directory.
    #[error("spec directory '{0}' does not exist")]
    MissingSpecDir(PathBuf),

    /// One or more of `spec.md`, `plan.md`, `tasks.md` is absent.
    #[error("spec directory missing required files: {}", .0.join(", "))]
    MissingSourceDocuments(Vec<String>),

    /// Blank decision identifier.
    #[error("a decision identifier is required")]
    MissingDecision,

    /// A required section is absent or empty.
    #[error("{document} must define a non-empty '{section}' section")]
    MissingRequiredSection {
        /// Source document file name.
        document: &'static str,
        /// Heading text.
        section: &'static str,
    },

    /// Rendering left tokens unresolved.
    #[error("capsule template has unresolved tokens: {}", .tokens.join(", "))]
    TemplateIncomplete {
        /// Tokens as written, e.g. `{{OWNER}}`.
        tokens: Vec<String>,
    },

    /// Rendered capsule is over the line ceiling.
    #[error("capsule exceeds {max} lines (rendered {lines})")]
    CapsuleTooLarge {
        /// Rendered line count.
        lines: usize,
        /// Ceiling.
        max: usize,
    },

    /// A seed failed Allowed Context resolution.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// Reading sources or the template, or writing the capsule.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl CapsuleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingSpecDir(_) => "CAPSULE_SPEC_DIR",
            Self::MissingSourceDocuments(_) => "CAPSULE_MISSING_FILES",
            Self::MissingDecision => "CAPSULE_MISSING_DECISION",
            Self::MissingRequiredSection { .. } => "CAPSULE_MISSING_SECTION",
            Self::TemplateIncomplete { .. } => "CAPSULE_TEMPLATE_INCOMPLETE",
            Self::CapsuleTooLarge { .. } => "CAPSULE_TOO_LARGE",
            Self::Reference(e) => e.code(),
            Self::Io { .. } => "CAPSULE_IO",
        }
    }
}

/// Result type for capsule operations.
pub type Result<T> = std::result::Result<T, CapsuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_documents_lists_names() {
        let err = CapsuleError::MissingSourceDocuments(vec!["plan.md".into(), "tasks.md".into()]);
        assert_eq!(
            err.to_string(),
            "spec directory missing required files: plan.md, tasks.md"
        );
        assert_eq!(err.code(), "CAPSULE_MISSING_FILES");
    }

    #[test]
    fn missing_section_names_document() {
        let err = CapsuleError::MissingRequiredSection {
            document: "tasks.md",
            section: "Acceptance Criteria",
        };
        assert_eq!(
            err.to_string(),
            "tasks.md must define a non-empty 'Acceptance Criteria' section"
        );
    }

    #[test]
    fn too_large_message() {
        let err = CapsuleError::CapsuleTooLarge { lines: 301, max: 300 };
        assert_eq!(err.to_string(), "capsule exceeds 300 lines (rendered 301)");
        assert_eq!(err.code(), "CAPSULE_TOO_LARGE");
    }

    #[test]
    fn reference_code_passes_through() {
        let err: CapsuleError = ReferenceError::MissingReference { path: "a.md".into() }.into();
        assert_eq!(err.code(), "MISSING_REFERENCE");
        assert_eq!(err.to_string(), "reference does not exist: a.md");
    }
}
