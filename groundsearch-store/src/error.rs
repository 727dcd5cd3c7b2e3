//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Config Error
// ============================================================================

/// Configuration errors. All of them are fatal before any row is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Could not read config file {path}: {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the settings schema.
    #[error("Invalid config file {path}: {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// A setting has an unusable value.
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        /// Setting key or environment variable.
        key: String,
        /// Offending value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No API key in the environment.
    #[error("Missing API key: set GEMINI_API_KEY (or GOOGLE_API_KEY)")]
    MissingCredential,

    /// The config file could not be written.
    #[error("Could not write config file: {0}")]
    Write(#[from] StoreError),
}

impl ConfigError {
    pub(crate) fn invalid(
        key: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Store Error
// ============================================================================

/// Errors reading or writing files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input file is not a CSV file.
    #[error("Input file must be a .csv file: {}", .0.display())]
    NotCsv(PathBuf),

    /// A required CSV column is absent.
    #[error("Missing required column {column:?} in {}", .path.display())]
    MissingColumn {
        /// Column name.
        column: String,
        /// CSV file path.
        path: PathBuf,
    },
}
