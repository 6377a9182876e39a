//! Error type shared by every command handler.
//!
//! Handlers return `Result<(), CliError>`; [`crate::run`] prints the error and
//! maps it to [`crate::exit_code::ERROR`].

use duelyard_engine::errors::BattleError;
use duelyard_lobby::{QueueError, RepositoryError};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    /// I/O error (deck files, record files, stdout/stderr writes)
    Io(std::io::Error),

    /// Invalid user input such as a malformed deck file
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// The engine refused to start a battle
    Battle(BattleError),

    /// Matchmaking or persistence failure in the lobby
    Lobby(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Battle(e) => write!(f, "Battle error: {}", e),
            CliError::Lobby(msg) => write!(f, "Lobby error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Battle(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<BattleError> for CliError {
    fn from(error: BattleError) -> Self {
        CliError::Battle(error)
    }
}

impl From<QueueError> for CliError {
    fn from(error: QueueError) -> Self {
        match error {
            QueueError::Battle(e) => CliError::Battle(e),
            other => CliError::Lobby(other.to_string()),
        }
    }
}

impl From<RepositoryError> for CliError {
    fn from(error: RepositoryError) -> Self {
        CliError::Lobby(error.to_string())
    }
}
