//! Settings error types.

use thiserror::Error;

/// Result alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Failures while loading or decoding a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("failed to read settings file {path}: {reason}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error text.
        reason: String,
    },

    /// Settings file or merged value did not decode.
    #[error("failed to parse settings: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
