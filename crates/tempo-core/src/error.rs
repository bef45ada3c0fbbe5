//! Error types for the tempo core library.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all tempo operations.
#[derive(Error, Debug)]
pub enum TempoError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// No stored document for the given session ID
    #[error("Session '{id}' not found")]
    SessionNotFound { id: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// A save dispatched by the autosave queue was rejected by its backend
    #[error("Save failed: {message}")]
    SaveFailed { message: String },
    /// Errors raised by a save backend that is not the local store
    #[error("Backend error: {message}")]
    Backend { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> TempoError {
        TempoError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> TempoError {
        TempoError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl TempoError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a backend error from any displayable cause.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Wraps a rejected save so it can be handed to every waiting ticket.
    ///
    /// The original error goes to the queue's error handler; tickets receive
    /// this flattened copy since the source error is not `Clone`.
    pub(crate) fn save_failed(source: &TempoError) -> Self {
        Self::SaveFailed {
            message: source.to_string(),
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| TempoError::database(message).with_source(e))
    }
}

/// Maps a failed `spawn_blocking` join into a configuration error.
pub(crate) fn join_error(e: tokio::task::JoinError) -> TempoError {
    TempoError::Configuration {
        message: format!("Task join error: {e}"),
    }
}

/// Result type alias for tempo operations
pub type Result<T> = std::result::Result<T, TempoError>;
