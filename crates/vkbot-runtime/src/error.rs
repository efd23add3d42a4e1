//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The API transport could not be built.
    #[error("Transport error: {0}")]
    Transport(#[from] vkbot_core::TransportError),

    /// `run` was called while another run is in progress.
    #[error("Runtime is already running")]
    AlreadyRunning,

    /// The runtime was shut down and cannot run again.
    #[error("Runtime has been shut down")]
    ShutDown,

    /// Installing the shutdown signal handlers failed.
    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
