//! Layered settings resolution.
//!
//! Compiled defaults are serialized to JSON, the repository file is merged
//! over them key by key, and the result is decoded back before `SENTINEL_*`
//! variables are applied. Nested objects merge; any other value in the file
//! replaces the default outright, except `null`, which leaves it alone.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::SentinelSettings;

/// `<root>/.sentinel/settings.json`.
pub fn settings_path(root: &Path) -> PathBuf {
    root.join(".sentinel").join("settings.json")
}

/// Settings for a repository root, environment included.
pub fn load_settings(root: &Path) -> Result<SentinelSettings> {
    load_settings_from_path(&settings_path(root))
}

/// Settings from an explicit file, environment included.
///
/// A missing file means defaults; an unreadable file or malformed JSON is an
/// error, as is a value of the wrong type (`"capsule": "flat"`).
pub fn load_settings_from_path(path: &Path) -> Result<SentinelSettings> {
    let parse = |source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let mut layered = serde_json::to_value(SentinelSettings::default()).map_err(parse)?;

    match std::fs::read_to_string(path) {
        Ok(raw) => {
            debug!(path = %path.display(), "merging repository settings");
            let file: Value = serde_json::from_str(&raw).map_err(parse)?;
            merge_into(&mut layered, file);
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no repository settings");
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    let mut settings: SentinelSettings = serde_json::from_value(layered).map_err(parse)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// `base` with `overlay` merged over it.
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    merge_into(&mut base, overlay);
    base
}

fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_into(slot, value),
                    None if !value.is_null() => {
                        let _ = base_map.insert(key, value);
                    }
                    None => {}
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Apply `SENTINEL_*` process environment overrides.
pub fn apply_env_overrides(settings: &mut SentinelSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable source.
///
/// Empty values are ignored so that `SENTINEL_LOG_LEVEL=` does not blank out
/// a configured level.
pub fn apply_overrides(settings: &mut SentinelSettings, lookup: impl Fn(&str) -> Option<String>) {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = read("SENTINEL_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read("SENTINEL_LIMITS_CONFIG") {
        settings.limits.config_path = v;
    }
    if let Some(v) = read("SENTINEL_LIMITS_SCHEMA") {
        settings.limits.schema_path = Some(v);
    }
    if let Some(v) = read("SENTINEL_CAPSULE_TEMPLATE") {
        settings.capsule.template_path = v;
    }
    if let Some(v) = read("SENTINEL_DEFAULT_AGENT") {
        settings.capsule.default_agent = v;
    }
}
