//! Error types for server control.

use std::time::Duration;

use thiserror::Error;

use crate::controller::ServerStatus;

/// Errors raised by the experiment server controller.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured launch command is empty or unparseable.
    #[error("invalid server command: {0:?}")]
    InvalidCommand(String),

    /// Spawning or signalling the child process failed.
    #[error("server process error: {0}")]
    Process(#[from] std::io::Error),

    /// The server did not reach the requested status in time.
    #[error("server did not reach '{target}' within {timeout:?}")]
    WaitTimeout {
        target: ServerStatus,
        timeout: Duration,
    },

    /// A start was requested while the server is already up.
    #[error("server is already running")]
    AlreadyRunning,

    /// A stop was requested while nothing is running.
    #[error("server is not running")]
    NotRunning,
}
