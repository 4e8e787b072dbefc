//! Errors raised while resolving settings.

use std::path::PathBuf;

use thiserror::Error;

/// Why settings could not be resolved.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON, or a key has the wrong type.
    #[error("invalid settings in {}: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
}

impl SettingsError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "SETTINGS_READ",
            Self::Parse { .. } => "SETTINGS_PARSE",
        }
    }
}

/// Result alias for settings resolution.
pub type Result<T> = std::result::Result<T, SettingsError>;
