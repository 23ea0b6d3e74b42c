//! UseCase 層のエラー型

use thiserror::Error;

/// Errors of `JoinGameUseCase`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinGameError {
    #[error("Session '{0}' not found")]
    SessionNotFound(String),
}

/// Errors of `UpdateGameUseCase`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    #[error("Session '{0}' has not joined a game")]
    NotInGame(String),

    #[error("Game '{0}' not found")]
    GameNotFound(String),

    #[error("Self update from session '{0}' is not a JSON object")]
    InvalidSelfState(String),
}

/// Errors of `GetGameDetailUseCase`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetGameDetailError {
    #[error("Game '{0}' not found")]
    GameNotFound(String),
}
