//! Limits configuration types and loader.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::schema::{SchemaCache, SchemaSource, validate_document};
use crate::errors::LimitsError;
use crate::paths::clean_reference;

/// Fraction of a budget at which near-limit warnings start.
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.9;

fn default_warning_threshold() -> f64 {
    DEFAULT_WARNING_THRESHOLD
}

/// A class of files sharing a line budget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRule {
    /// Display name.
    pub name: String,
    /// Root-relative patterns selecting the files.
    pub globs: Vec<String>,
    /// Per-class budget; falls back to the default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<usize>,
    /// Whether each file must carry a valid `Allowed Context` section.
    #[serde(default)]
    pub enforce_allowed_context: bool,
}

/// A pattern-scoped budget exception.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRule {
    /// Root-relative glob.
    pub pattern: String,
    /// Budget for matching files. An override without a positive one never wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<usize>,
    /// Why the exception exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Validated limits configuration, immutable for a lint run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsConfig {
    /// Budget when neither an override nor the artifact rule sets one.
    pub default_max_lines: usize,
    /// Near-limit warning fraction, `0 < t <= 1`.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,
    /// Path prefixes that may never appear in an Allowed Context list.
    pub forbidden_paths: Vec<String>,
    /// Artifact classes, evaluated in order.
    pub artifacts: Vec<ArtifactRule>,
    /// Budget exceptions, first match wins.
    #[serde(default)]
    pub overrides: Vec<OverrideRule>,
    /// File the config was loaded from.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    /// Schema file used, or `None` for the embedded schema.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
}

impl LimitsConfig {
    /// Decode an already schema-checked document, then enforce the threshold
    /// range and normalize every path.
    pub fn from_value(value: Value, origin: &Path) -> Result<Self, LimitsError> {
        let mut config: Self = serde_json::from_value(value).map_err(|e| LimitsError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;

        let threshold = config.warning_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(LimitsError::Threshold(threshold));
        }

        normalize_all(&mut config.forbidden_paths);
        for rule in &mut config.artifacts {
            normalize_all(&mut rule.globs);
        }
        for rule in &mut config.overrides {
            rule.pattern = normalize_config_path(&rule.pattern);
        }
        config.config_path = Some(origin.to_path_buf());
        Ok(config)
    }
}

/// Config path normalization: shared cleanup, blank becomes `.`.
pub fn normalize_config_path(value: &str) -> String {
    let cleaned = clean_reference(value);
    if cleaned.is_empty() { ".".to_string() } else { cleaned }
}

fn normalize_all(values: &mut [String]) {
    for value in values {
        *value = normalize_config_path(value);
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Read a JSON or YAML document into a JSON object.
fn read_document(path: &Path) -> Result<Value, LimitsError> {
    let text = std::fs::read_to_string(path).map_err(|source| LimitsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |message: String| LimitsError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let value = if is_yaml(path) {
        let value: Value = serde_yaml::from_str(&text).map_err(|e| parse_error(e.to_string()))?;
        if value.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            value
        }
    } else {
        serde_json::from_str(&text).map_err(|e| parse_error(e.to_string()))?
    };

    if !value.is_object() {
        return Err(parse_error("limits config must be an object".into()));
    }
    Ok(value)
}

/// Load, schema-check, and normalize a limits configuration.
///
/// `config_path` and a file `schema` are taken relative to `root` unless
/// absolute.
pub fn load_limits(
    root: &Path,
    config_path: &Path,
    schema: &SchemaSource,
    cache: &SchemaCache,
) -> Result<LimitsConfig, LimitsError> {
    let config_path = root.join(config_path);
    let schema = match schema {
        SchemaSource::File(path) => SchemaSource::File(root.join(path)),
        SchemaSource::Embedded => SchemaSource::Embedded,
    };
    debug!(config = %config_path.display(), schema = %schema.name(), "loading limits");

    let document = read_document(&config_path)?;
    let validator = cache.get_or_compile(&schema)?;
    validate_document(&validator, &document, &config_path)?;

    let mut config = LimitsConfig::from_value(document, &config_path)?;
    if let SchemaSource::File(path) = schema {
        config.schema_path = Some(path);
    }
    info!(
        artifacts = config.artifacts.len(),
        overrides = config.overrides.len(),
        default_max_lines = config.default_max_lines,
        "limits loaded"
    );
    Ok(config)
}
