//! Limits configuration: line budgets, forbidden paths, artifact rules.
//!
//! Loaded once per lint run from a JSON or YAML document that must pass the
//! Draft-7 schema before it is decoded.

pub mod config;
pub mod schema;

pub use config::{
    ArtifactRule, DEFAULT_WARNING_THRESHOLD, LimitsConfig, OverrideRule, load_limits,
    normalize_config_path,
};
pub use schema::{EMBEDDED_SCHEMA, SchemaCache, SchemaSource, validate_document};
