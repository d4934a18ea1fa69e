//! Error types for vernote-core

use thiserror::Error;

use crate::models::DecodeError;
use crate::sync::SyncError;
use crate::verification::PasscodeError;

/// Result type alias using vernote-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vernote-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote list/create/update failed
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Passcode entry was rejected
    #[error(transparent)]
    Passcode(#[from] PasscodeError),

    /// Stored verification list could not be parsed
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Note or verifier not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client configuration is incomplete or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
