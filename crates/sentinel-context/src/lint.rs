//! Batch context linter.
//!
//! Unlike Allowed Context resolution, the linter never fails fast: every
//! discovered file is evaluated and all findings are collected into one
//! [`LintReport`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::engine::LimitsEngine;
use crate::errors::{ReferenceError, Result as ContextResult};
use crate::issues::{Issue, Severity};
use crate::limits::{LimitsConfig, SchemaCache, SchemaSource, load_limits};
use crate::paths::normalize_reference;

/// Restricts a lint run to specific root-relative files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncludeFilter {
    paths: BTreeSet<String>,
}

impl IncludeFilter {
    /// Normalize caller paths (relative to `root`, or absolute inside it).
    ///
    /// Any path escaping the root rejects the whole filter.
    pub fn new<S: AsRef<str>>(root: &Path, paths: &[S]) -> Result<Self, ReferenceError> {
        let paths = paths
            .iter()
            .map(|raw| normalize_reference(root, raw.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { paths })
    }

    /// Whether `file` is selected.
    pub fn contains(&self, file: &str) -> bool {
        self.paths.contains(file)
    }

    /// Normalized paths.
    pub fn paths(&self) -> &BTreeSet<String> {
        &self.paths
    }

    /// Whether no paths were given.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Outcome of one lint run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    /// Files evaluated.
    pub checked_files: usize,
    /// Findings sorted by file, then code.
    pub issues: Vec<Issue>,
    /// Whether warnings fail the run.
    pub strict: bool,
}

impl LintReport {
    /// Number of error-severity issues.
    pub fn errors(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Error).count()
    }

    /// Number of warning-severity issues.
    pub fn warnings(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Warning).count()
    }

    /// Errors always fail; warnings fail only in strict mode.
    pub fn should_fail(&self) -> bool {
        self.errors() > 0 || (self.strict && self.warnings() > 0)
    }

    /// Report plus `errors`, `warnings`, and `ok` summary fields.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "checkedFiles": self.checked_files,
            "issues": self.issues,
            "strict": self.strict,
            "errors": self.errors(),
            "warnings": self.warnings(),
            "ok": !self.should_fail(),
        })
    }
}

/// Applies a [`LimitsEngine`] across every discovered artifact.
#[derive(Debug)]
pub struct ContextLinter {
    engine: LimitsEngine,
}

impl ContextLinter {
    /// Wrap a compiled engine.
    pub fn new(engine: LimitsEngine) -> Self {
        Self { engine }
    }

    /// Compile `config` against `root` and wrap it.
    pub fn from_config(root: impl Into<PathBuf>, config: LimitsConfig) -> Result<Self, ReferenceError> {
        Ok(Self::new(LimitsEngine::new(root, config)?))
    }

    /// Load, validate, and compile the limits config at `config_path`.
    ///
    /// Fails with the limits error when the file is missing or invalid, and
    /// with the reference error when an artifact glob escapes `root`.
    pub fn load(
        root: impl Into<PathBuf>,
        config_path: &Path,
        schema: &SchemaSource,
        cache: &SchemaCache,
    ) -> ContextResult<Self> {
        let root = root.into();
        let config = load_limits(&root, config_path, schema, cache)?;
        Ok(Self::from_config(root, config)?)
    }

    /// The underlying engine.
    pub fn engine(&self) -> &LimitsEngine {
        &self.engine
    }

    /// Evaluate every target, optionally restricted to `include`.
    pub fn run(&self, include: Option<&IncludeFilter>, strict: bool) -> LintReport {
        let targets = self.engine.collect_targets(include.map(IncludeFilter::paths));
        let mut issues: Vec<Issue> = targets
            .iter()
            .flat_map(|target| self.engine.check_file(target))
            .collect();
        issues.sort_by(|a, b| (a.file.as_str(), a.code.as_str()).cmp(&(b.file.as_str(), b.code.as_str())));

        let report = LintReport {
            checked_files: targets.len(),
            issues,
            strict,
        };
        if report.should_fail() {
            warn!(
                checked = report.checked_files,
                errors = report.errors(),
                warnings = report.warnings(),
                strict,
                "context lint failed"
            );
        } else {
            info!(
                checked = report.checked_files,
                warnings = report.warnings(),
                "context lint passed"
            );
        }
        report
    }
}
