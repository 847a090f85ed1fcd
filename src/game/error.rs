//! Error taxonomy of the simulation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A rejected movement or ability attempt. Reported only to its originator.
    #[error("{0}")]
    InvalidAction(String),
    /// A malformed developer chat command. Reported to its sender.
    #[error("{0}")]
    InvalidCommand(String),
    /// The game cannot be set up with the given parameters. Fatal to that game's start.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl GameError {
    pub fn invalid_action(message: impl Into<String>) -> Self {
        GameError::InvalidAction(message.into())
    }

    pub fn invalid_command(message: impl Into<String>) -> Self {
        GameError::InvalidCommand(message.into())
    }

    /// Stable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidAction(_) => "INVALID_ACTION",
            GameError::InvalidCommand(_) => "INVALID_COMMAND",
            GameError::Configuration(_) => "CONFIGURATION",
        }
    }

    /// Event name under which the error is delivered.
    pub fn event(&self) -> &'static str {
        match self {
            GameError::InvalidAction(_) => "message",
            GameError::InvalidCommand(_) => "command error",
            GameError::Configuration(_) => "error",
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
