//! # Scriptable Engine
//!
//! Hook registry and script executor for service lifecycle events.
//!
//! - **Registry**: Maps events and custom commands to sequential actions
//! - **Executor**: Runs shell commands and in-process `.rhai` scripts
//! - **Shared State**: Host state and options handed to scripts by reference

pub mod hooks;
pub mod state;

// Re-export error types from core
pub use scriptable_core::{Error, Result};

// Re-export commonly used types
pub use hooks::{CommandDescriptor, HookAction, ScriptExecutor, Scriptable, Stream};
pub use state::SharedValue;
