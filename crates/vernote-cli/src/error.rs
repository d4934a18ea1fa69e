use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] vernote_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Verifier ID cannot be empty")]
    EmptyVerifierId,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Note not found for id/prefix: {0}")]
    NoteNotFound(String),
    #[error("Verifier not found for id/prefix: {0}")]
    VerifierNotFound(String),
    #[error("{0}")]
    AmbiguousId(String),
    #[error("Image file is empty: {0}")]
    EmptyImage(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
}

