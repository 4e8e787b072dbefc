//! Package-level constants and fixed repository layout.

/// Current version of the toolkit (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared background documents, relative to the repository root.
pub const CONTEXT_DIR: &str = ".sentinel/context";

/// Top-level subdirectories of [`CONTEXT_DIR`] kept out of Allowed Context.
///
/// `limits` holds maintainer-only configuration (budgets, schema).
pub const EXCLUDED_CONTEXT_DIRS: &[&str] = &["limits"];

/// Spec document inside a spec directory.
pub const SPEC_FILENAME: &str = "spec.md";

/// Plan document inside a spec directory.
pub const PLAN_FILENAME: &str = "plan.md";

/// Tasks document inside a spec directory.
pub const TASKS_FILENAME: &str = "tasks.md";

/// Rendered capsule, written beside the source documents.
pub const CAPSULE_FILENAME: &str = "capsule.md";

/// Repository capsule template, relative to the root. Optional.
pub const CAPSULE_TEMPLATE_PATH: &str = ".sentinel/templates/capsule.md";

/// Hard ceiling on rendered capsule lines.
pub const CAPSULE_MAX_LINES: usize = 300;
