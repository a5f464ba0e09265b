//! Error types for the board reconciler

use thiserror::Error;

/// Result type for board sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while talking to the board store or managing local state
#[derive(Debug, Error)]
pub enum SyncError {
    /// No board is currently open
    #[error("no active board")]
    NoActiveBoard,

    /// Board not found
    #[error("board not found: {id}")]
    BoardNotFound { id: String },

    /// List not found
    #[error("list not found: {id}")]
    ListNotFound { id: String },

    /// Card not found
    #[error("card not found: {id}")]
    CardNotFound { id: String },

    /// Permanent delete requested for a card that is still on the board
    #[error("card '{id}' must be archived before it can be deleted")]
    CardNotArchived { id: String },

    /// The board store answered with a non-success status
    #[error("{operation} rejected with status {status}")]
    Rejected { operation: String, status: u16 },

    /// Network or transport failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Base URL or endpoint could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Configuration loaded but failed validation
    #[error("invalid value for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    /// Failure injected by the in-memory store
    #[error("injected failure for {operation}")]
    Injected { operation: String },
}

impl SyncError {
    /// Create a rejected-response error
    pub fn rejected(operation: impl Into<String>, status: u16) -> Self {
        Self::Rejected {
            operation: operation.into(),
            status,
        }
    }

    /// Create a configuration validation error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True when the failure happened below HTTP (connect, timeout, body read)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
