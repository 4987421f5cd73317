//! Simulation error types.

use std::fmt;

/// Errors that can occur while setting up or running a simulation.
#[derive(Debug)]
pub enum SimError {
    /// Invalid configuration or user input
    Config(String),

    /// File or console I/O error
    Io(std::io::Error),

    /// Internal error (e.g. a client task panicked)
    Internal(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
