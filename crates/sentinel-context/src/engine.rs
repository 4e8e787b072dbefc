//! Budget resolution and per-file checks.
//!
//! [`LimitsEngine`] compiles every artifact glob and override pattern once,
//! then answers three questions per file: which budget applies, whether the
//! line count breaches it, and whether an embedded Allowed Context list is
//! sound.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use sentinel_core::count_lines;
use tracing::{debug, trace};

use crate::errors::ReferenceError;
use crate::issues::{Issue, IssueCode};
use crate::limits::{ArtifactRule, LimitsConfig, OverrideRule};
use crate::markdown::extract_bullets_from_heading;
use crate::paths::{assert_exists, normalize_reference};
use crate::pattern::RefPattern;

/// Heading of the embedded list checked on enforced artifacts.
pub const ALLOWED_CONTEXT_HEADING: &str = "Allowed Context";

/// A discovered file with its resolved budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactTarget {
    /// Root-relative posix path.
    pub file: String,
    /// Absolute path used for reading.
    pub absolute: PathBuf,
    /// Name of the artifact rule that selected the file.
    pub rule: String,
    /// Effective line budget.
    pub max_lines: usize,
    /// Whether the embedded Allowed Context list is checked.
    pub enforce_allowed_context: bool,
}

#[derive(Debug)]
struct CompiledArtifact {
    rule: ArtifactRule,
    patterns: Vec<RefPattern>,
}

#[derive(Debug)]
struct CompiledOverride {
    rule: OverrideRule,
    pattern: RefPattern,
}

/// Limits configuration bound to a repository root.
#[derive(Debug)]
pub struct LimitsEngine {
    root: PathBuf,
    config: LimitsConfig,
    artifacts: Vec<CompiledArtifact>,
    overrides: Vec<CompiledOverride>,
}

impl LimitsEngine {
    /// Compile the config's patterns against `root`.
    ///
    /// Artifact globs must stay inside the root.
    pub fn new(root: impl Into<PathBuf>, config: LimitsConfig) -> Result<Self, ReferenceError> {
        let root = root.into();
        let artifacts = config
            .artifacts
            .iter()
            .map(|rule| -> Result<CompiledArtifact, ReferenceError> {
                let patterns = rule
                    .globs
                    .iter()
                    .map(|glob| RefPattern::new(&normalize_reference(&root, glob)?))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CompiledArtifact {
                    rule: rule.clone(),
                    patterns,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let overrides = config
            .overrides
            .iter()
            .map(|rule| -> Result<CompiledOverride, ReferenceError> {
                Ok(CompiledOverride {
                    rule: rule.clone(),
                    pattern: RefPattern::new(&rule.pattern)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root,
            config,
            artifacts,
            overrides,
        })
    }

    /// Repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration this engine enforces.
    pub fn config(&self) -> &LimitsConfig {
        &self.config
    }

    /// Effective budget for `file` under `rule`.
    ///
    /// The first override whose pattern matches and which sets a positive
    /// budget wins; then the rule's own positive budget; then the default.
    pub fn resolve_budget(&self, file: &str, rule: &ArtifactRule) -> usize {
        for compiled in &self.overrides {
            if let Some(max) = compiled.rule.max_lines.filter(|&max| max > 0) {
                if compiled.pattern.matches(file) {
                    trace!(file, pattern = compiled.pattern.raw(), max, "override budget");
                    return max;
                }
            }
        }
        match rule.max_lines {
            Some(max) if max > 0 => max,
            _ => self.config.default_max_lines,
        }
    }

    /// Every file selected by the artifact rules, in rule order.
    ///
    /// A file selected by several rules is kept under the first. When
    /// `include` is given, only paths in it are kept.
    pub fn collect_targets(&self, include: Option<&BTreeSet<String>>) -> Vec<ArtifactTarget> {
        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for compiled in &self.artifacts {
            for pattern in &compiled.patterns {
                for file in pattern.discover(&self.root) {
                    if include.is_some_and(|set| !set.contains(&file)) {
                        continue;
                    }
                    if !seen.insert(file.clone()) {
                        continue;
                    }
                    let max_lines = self.resolve_budget(&file, &compiled.rule);
                    debug!(file = %file, rule = %compiled.rule.name, max_lines, "artifact target");
                    targets.push(ArtifactTarget {
                        absolute: self.root.join(&file),
                        file,
                        rule: compiled.rule.name.clone(),
                        max_lines,
                        enforce_allowed_context: compiled.rule.enforce_allowed_context,
                    });
                }
            }
        }
        targets
    }

    /// Read and check one target. An unreadable file yields a single
    /// `READ_ERROR`.
    pub fn check_file(&self, target: &ArtifactTarget) -> Vec<Issue> {
        match std::fs::read_to_string(&target.absolute) {
            Ok(content) => self.check_content(target, &content),
            Err(e) => vec![Issue::new(&target.file, IssueCode::ReadError, e.to_string())],
        }
    }

    /// Budget and Allowed Context checks over already-read content.
    pub fn check_content(&self, target: &ArtifactTarget, content: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        let lines = count_lines(content);
        if let Some(issue) = classify(
            &target.file,
            lines,
            target.max_lines,
            self.config.warning_threshold,
        ) {
            issues.push(issue);
        }
        if target.enforce_allowed_context {
            issues.extend(self.check_allowed_context(&target.file, content));
        }
        issues
    }

    /// Validate the `Allowed Context` list embedded in `content`.
    ///
    /// Only bullet items are entries; prose before the first bullet is
    /// ignored. Checks run in order per entry: normalization, existence,
    /// forbidden prefix, duplicate. A failure in the first two skips the rest.
    pub fn check_allowed_context(&self, file: &str, content: &str) -> Vec<Issue> {
        let entries = extract_bullets_from_heading(content, ALLOWED_CONTEXT_HEADING);
        if entries.is_empty() {
            return vec![Issue::new(
                file,
                IssueCode::MissingAllowedContext,
                "Allowed Context section is missing or empty",
            )];
        }

        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        for entry in &entries {
            let normalized = match normalize_reference(&self.root, entry) {
                Ok(normalized) => normalized,
                Err(e) => {
                    issues.push(Issue::new(file, IssueCode::InvalidInclude, format!("{entry} -> {e}")));
                    continue;
                }
            };
            if let Err(e) = assert_exists(&self.root, &normalized) {
                issues.push(Issue::new(
                    file,
                    IssueCode::MissingInclude,
                    format!("{normalized} -> {e}"),
                ));
                continue;
            }
            if is_forbidden(&normalized, &self.config.forbidden_paths) {
                issues.push(Issue::new(
                    file,
                    IssueCode::ForbiddenInclude,
                    format!("{normalized} is listed in forbiddenPaths"),
                ));
            }
            if !seen.insert(normalized.clone()) {
                issues.push(Issue::new(
                    file,
                    IssueCode::DuplicateInclude,
                    format!("{normalized} is duplicated"),
                ));
            }
        }
        issues
    }
}

/// Compare a line count against its budget.
///
/// `MAX_LINES` when strictly over; otherwise `NEAR_LIMIT` when the ratio
/// reaches `threshold` (inclusive). A zero budget never warns.
#[allow(clippy::cast_precision_loss)]
pub fn classify(file: &str, line_count: usize, budget: usize, threshold: f64) -> Option<Issue> {
    if line_count > budget {
        return Some(Issue::new(
            file,
            IssueCode::MaxLines,
            format!("exceeds {budget} line budget ({line_count} lines)"),
        ));
    }
    if budget == 0 || line_count == 0 {
        return None;
    }
    let ratio = line_count as f64 / budget as f64;
    (ratio >= threshold).then(|| {
        Issue::new(
            file,
            IssueCode::NearLimit,
            format!("at {:.1}% of limit ({line_count}/{budget})", ratio * 100.0),
        )
    })
}

/// Whether `entry` equals, or sits under, any forbidden prefix.
pub fn is_forbidden(entry: &str, forbidden: &[String]) -> bool {
    forbidden.iter().any(|prefix| {
        entry == prefix
            || entry
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    })
}
