//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`,
//! so a settings file only needs the keys it changes.

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// # JSON Format
///
/// ```json
/// {
///   "limits": { "configPath": "ops/limits.yaml" },
///   "capsule": { "defaultAgent": "PLANNER" },
///   "logging": { "level": "info" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SentinelSettings {
    /// Where the limits configuration and its schema live.
    pub limits: LimitsSettings,
    /// Capsule rendering settings.
    pub capsule: CapsuleSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Location of the limits configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LimitsSettings {
    /// Limits config path, relative to the repository root.
    pub config_path: String,
    /// Schema path, relative to the repository root. `None` uses the embedded schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<String>,
}

impl Default for LimitsSettings {
    fn default() -> Self {
        Self {
            config_path: ".sentinel/context/limits/context-limits.json".to_string(),
            schema_path: None,
        }
    }
}

/// Capsule rendering settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapsuleSettings {
    /// Template path, relative to the repository root. Falls back to the
    /// built-in template when the file does not exist.
    pub template_path: String,
    /// Agent named in the `ProducedBy` header when none is given.
    pub default_agent: String,
}

impl Default for CapsuleSettings {
    fn default() -> Self {
        Self {
            template_path: ".sentinel/templates/capsule.md".to_string(),
            default_agent: "ROUTER".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}
