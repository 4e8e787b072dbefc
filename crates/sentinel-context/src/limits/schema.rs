//! Limits schema compilation and validation.
//!
//! Compiled validators live in a [`SchemaCache`] owned by the caller. There
//! is no process-wide cache; dropping the cache or calling
//! [`SchemaCache::clear`] forces recompilation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsonschema::{Draft, Validator};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::errors::LimitsError;

/// Draft-7 schema compiled into the binary.
pub const EMBEDDED_SCHEMA: &str = include_str!("../../schema/context-limits.schema.json");

const EMBEDDED_KEY: &str = "<embedded>";

/// Where the limits schema comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SchemaSource {
    /// [`EMBEDDED_SCHEMA`].
    Embedded,
    /// A schema file on disk.
    File(PathBuf),
}

impl SchemaSource {
    /// Embedded when `path` is `None`.
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Embedded, Self::File)
    }

    /// Cache key and display name.
    pub fn name(&self) -> String {
        match self {
            Self::Embedded => EMBEDDED_KEY.to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    fn load(&self) -> Result<Value, LimitsError> {
        let (text, path) = match self {
            Self::Embedded => (EMBEDDED_SCHEMA.to_string(), PathBuf::from(EMBEDDED_KEY)),
            Self::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| LimitsError::Read {
                    path: path.clone(),
                    source,
                })?;
                (text, path.clone())
            }
        };
        serde_json::from_str(&text).map_err(|e| LimitsError::Parse {
            path,
            message: e.to_string(),
        })
    }
}

/// Compiled limits validators keyed by [`SchemaSource::name`].
#[derive(Default)]
pub struct SchemaCache {
    validators: Mutex<HashMap<String, Arc<Validator>>>,
}

impl SchemaCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the validator for `source`, compiling it on first use.
    pub fn get_or_compile(&self, source: &SchemaSource) -> Result<Arc<Validator>, LimitsError> {
        let key = source.name();
        if let Some(validator) = self.validators.lock().get(&key) {
            return Ok(Arc::clone(validator));
        }

        let schema = source.load()?;
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(&schema)
            .map_err(|e| LimitsError::SchemaInvalid {
                source_name: key.clone(),
                message: e.to_string(),
            })?;
        debug!(schema = %key, "compiled limits schema");

        let validator = Arc::new(validator);
        let _ = self
            .validators
            .lock()
            .insert(key, Arc::clone(&validator));
        Ok(validator)
    }

    /// Drop the compiled validator for `source`.
    pub fn invalidate(&self, source: &SchemaSource) {
        let _ = self.validators.lock().remove(&source.name());
    }

    /// Drop every compiled validator.
    pub fn clear(&self) {
        self.validators.lock().clear();
    }

    /// Number of compiled validators held.
    pub fn len(&self) -> usize {
        self.validators.lock().len()
    }

    /// Whether nothing is compiled yet.
    pub fn is_empty(&self) -> bool {
        self.validators.lock().is_empty()
    }
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCache")
            .field("compiled", &self.len())
            .finish()
    }
}

/// Check `value` against `validator`, reporting every violation at once.
///
/// Violations are sorted by instance path and rendered one per line as
/// `$<path> -> <message>`.
pub fn validate_document(
    validator: &Validator,
    value: &Value,
    config_path: &Path,
) -> Result<(), LimitsError> {
    let mut violations: Vec<(String, String)> = validator
        .iter_errors(value)
        .map(|err| (format!("${}", err.instance_path()), err.to_string()))
        .collect();
    if violations.is_empty() {
        return Ok(());
    }
    violations.sort();
    let message = violations
        .iter()
        .map(|(path, message)| format!("{path} -> {message}"))
        .collect::<Vec<_>>()
        .join("\n");
    Err(LimitsError::Validation {
        path: config_path.to_path_buf(),
        message,
    })
}
