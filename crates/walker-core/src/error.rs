//! Error types for the simulation.

use crate::{AgentId, Position};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Position {0} is out of bounds")]
    OutOfBounds(Position),

    #[error("Agent {0} is already placed on the grid")]
    AlreadyPlaced(AgentId),

    #[error("Agent {0} is not placed on the grid")]
    NotPlaced(AgentId),

    #[error("Unknown agent: {0}")]
    UnknownAgent(AgentId),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
}

impl Error {
    /// True for errors caused by caller input rather than internal state
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::UnknownParameter(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
