//! # sentinel-settings
//!
//! Tool settings with layered sources.
//!
//! Settings are loaded from three layers (lowest priority first):
//! 1. **Compiled defaults**: [`SentinelSettings::default()`]
//! 2. **Repository file**: `<root>/.sentinel/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `SENTINEL_*` overrides (highest priority)
//!
//! Unlike budgets and forbidden paths (which live in the schema-validated
//! limits config), these settings only locate inputs and tune output.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
