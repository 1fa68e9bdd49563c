//! Error types for the Vox core.
//!
//! Policy: nothing crosses the interpreter boundary as an unhandled failure.
//! Collaborator and storage errors are caught where they occur and converted
//! to a deterministic user-facing response string; `VoxError` exists for the
//! boundaries below that point (stores, config, HTTP clients).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoxError {
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("collaborator error: {0}")]
    Collaborator(String),
}

pub type Result<T> = std::result::Result<T, VoxError>;
