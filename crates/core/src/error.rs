//! Base error types for scriptable
//!
//! This module provides the foundation error types that all crates can use.

use std::path::PathBuf;
use thiserror::Error;

/// Base error type for hook resolution and execution
#[derive(Error, Debug)]
pub enum Error {
    /// A shell command exited non-zero, could not be spawned, or timed out
    ///
    /// Has no source: the shell's own diagnostic already went to
    /// the (possibly redirected) stderr stream.
    #[error("Failed to run command: {command}")]
    CommandExecution {
        /// The specification string exactly as configured
        command: String,
    },

    /// A source script failed to compile or raised an error while running
    ///
    /// The engine error is the source, so its message, kind and position
    /// survive unchanged in the error chain.
    #[error("Script {} failed", path.display())]
    ScriptEvaluation {
        /// Path of the script that failed
        path: PathBuf,
        /// The script engine's error, kept intact
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A source script could not be read from disk
    #[error("Failed to read script {}: {source}", path.display())]
    ScriptRead {
        /// Path of the script
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No hook is registered for the event
    #[error("No hook registered for event '{0}'")]
    HookNotFound(String),

    /// No custom command is registered under the name
    #[error("No custom command named '{0}'")]
    CommandNotFound(String),

    /// Host state conversion error
    #[error("State error: {0}")]
    State(String),

    /// Service description could not be loaded
    #[error("Failed to load service description {}: {message}", path.display())]
    ServiceLoad {
        /// Path of the service file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Create a `CommandExecution` error for the given specification string
    pub fn command(command: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
        }
    }

    /// Create a `ScriptEvaluation` error wrapping a script engine error
    pub fn script<E>(path: impl Into<PathBuf>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ScriptEvaluation {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
