//! Error types for CLI commands

use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// A hook, command or script failed
    #[error(transparent)]
    Hook(#[from] scriptable_core::Error),

    /// Malformed `-o KEY=VALUE` option
    #[error("Invalid option '{0}': expected KEY=VALUE")]
    InvalidOption(String),

    /// Output serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;
