//! Domain error types.

use thiserror::Error;

/// Errors reported by the repositories
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Game '{0}' not found")]
    GameNotFound(String),
}

/// Errors reported by a `MessagePusher`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),

    #[error("Failed to encode message: {0}")]
    EncodeFailed(String),
}
