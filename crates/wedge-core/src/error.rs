use thiserror::Error;

use crate::state::RunState;

#[derive(Error, Debug)]
pub enum Error {
    // Lifecycle errors
    #[error("Reader is already running")]
    AlreadyRunning,

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: RunState, to: RunState },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Runtime errors
    #[error("Runtime error: {0}")]
    Runtime(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
