//! Custom error types for ynab-reconciler
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for reconciliation runs
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// No usable API token from the environment, flags or prompt
    #[error("Missing YNAB token. Set YNAB_TOKEN, pass --token, or enter it when prompted")]
    MissingToken,

    /// No usable CSV path from the environment, flags or prompt
    #[error("Missing CSV path. Set YNAB_CSV, pass --csv, or enter it when prompted")]
    MissingCsvPath,

    /// Operator picked an index outside the menu
    #[error("Invalid choice: {0}")]
    InvalidChoice(String),

    /// The API rejected the credential
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Transport failure or unusable response from the API
    #[error("Network error: {0}")]
    Network(String),

    /// CSV file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// CSV could not be read as records
    #[error("Parse error: {0}")]
    Parse(String),

    /// A single record is missing or has an unparsable required field
    #[error("Malformed record {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Transaction cache errors
    #[error("Cache error: {0}")]
    Cache(String),
}

impl ReconcileError {
    /// Create a malformed-record error for a given row
    pub fn malformed(row: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            row,
            reason: reason.into(),
        }
    }

    /// Check if this error must abort the run.
    ///
    /// Only a malformed record is recoverable; it is reported and skipped.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MalformedRecord { .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for ReconcileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ReconcileError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;
