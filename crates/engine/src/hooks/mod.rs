//! Hook system
//!
//! Registers one action per configured event and per custom command and runs
//! their specifications through the script executor.
//!
//! ## Execution Model
//!
//! - Entries of one specification run strictly in order; entry N+1 starts
//!   only after entry N has settled, deferred script results included
//! - The first failing entry aborts the rest of its action
//! - `.rhai` files that exist are evaluated in-process, everything else runs
//!   through the platform shell
//!
//! ## Module Organization
//!
//! - `config`: Entry classification and command descriptors
//! - `context`: Isolated script evaluation
//! - `executor`: Runs one entry with the configured streams
//! - `registry`: Event and command registration
//! - `streams`: Standard stream routing

pub mod config;
mod context;
pub mod executor;
pub mod registry;
pub mod streams;

// Re-export main types for convenience
pub use config::{COMMAND_LIFECYCLE_EVENT, CommandDescriptor, SCRIPT_EXTENSION, ScriptKind, command_event};
pub use context::Deferred;
pub use executor::{EVENT_ENV_VAR, ScriptExecutor, ScriptExecutorBuilder};
pub use registry::{HookAction, Scriptable};
pub use streams::Stream;
