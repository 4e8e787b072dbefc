//! # sentinel-context
//!
//! Context integrity for agent-facing documents.
//!
//! - [`markdown`]: heading-scoped section and list extraction
//! - [`paths`]: reference normalization with root-escape protection
//! - [`pattern`]: glob-bearing references compiled once into matchers
//! - [`allowed_context`]: shared background docs + seeds → sorted Allowed Context
//! - [`limits`]: schema-validated line budgets, overrides, and forbidden paths
//! - [`engine`]: budget resolution and per-file checks
//! - [`lint`]: batch linter producing a report instead of failing fast

#![deny(unsafe_code)]

pub mod allowed_context;
pub mod engine;
pub mod errors;
pub mod issues;
pub mod limits;
pub mod lint;
pub mod markdown;
pub mod paths;
pub mod pattern;

pub use allowed_context::{
    AllowedContextEntry, build_allowed_context, discover_allowed_context, list_context_files,
};
pub use engine::{ArtifactTarget, LimitsEngine, classify, is_forbidden};
pub use errors::{ContextError, LimitsError, ReferenceError, Result};
pub use issues::{Issue, IssueCode, Severity};
pub use limits::{
    ArtifactRule, LimitsConfig, OverrideRule, SchemaCache, SchemaSource, load_limits,
};
pub use lint::{ContextLinter, IncludeFilter, LintReport};
pub use markdown::{
    extract_bullets, extract_bullets_from_heading, extract_list, extract_list_from_heading,
    extract_section,
};
pub use paths::{assert_exists, normalize_reference};
pub use pattern::RefPattern;
