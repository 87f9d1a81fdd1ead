//! Error types for xiaoxian-survey.
//!
//! This module defines all error types used throughout the crate, grouped by
//! the concern that raises them.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for survey operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Form Errors ===
    /// A required question has no answer.
    #[error("question '{field}' requires an answer")]
    MissingAnswer {
        /// Wire key of the unanswered question.
        field: &'static str,
    },

    /// An answer does not fit the question it was given for.
    #[error("invalid answer for '{field}': {message}")]
    InvalidAnswer {
        /// Wire key of the question.
        field: String,
        /// Description of what is wrong with the answer.
        message: String,
    },

    /// A rating outside the 1-5 scale.
    #[error("scale rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i64),

    /// An unknown scale field key.
    #[error("unknown scale field: {0}")]
    UnknownField(String),

    /// Interactive input ended before the form was complete.
    #[error("input ended before the questionnaire was complete")]
    FormAborted,

    // === Share Errors ===
    /// The share address could not be encoded as a QR code.
    #[error("failed to encode QR code: {0}")]
    QrEncode(#[from] qrcode::types::QrError),

    /// Clipboard access failed.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for survey operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid answer error.
    #[must_use]
    pub fn invalid_answer(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAnswer {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a clipboard error.
    #[must_use]
    pub fn clipboard(message: impl Into<String>) -> Self {
        Self::Clipboard(message.into())
    }

    /// Check if this error came from respondent input rather than the system.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::MissingAnswer { .. }
                | Self::InvalidAnswer { .. }
                | Self::RatingOutOfRange(_)
                | Self::UnknownField(_)
        )
    }
}
