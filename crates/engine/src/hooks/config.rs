//! Hook entry classification and command descriptors

use scriptable_config::Specification;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File extension of scripts evaluated in-process
pub const SCRIPT_EXTENSION: &str = "rhai";

/// The single lifecycle stage of a custom command
pub const COMMAND_LIFECYCLE_EVENT: &str = "command";

/// How a specification entry is run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptKind {
    /// An existing `.rhai` file, evaluated in an isolated script context
    Source(PathBuf),
    /// Anything else, run through the platform shell
    ///
    /// This includes existing executables and shell scripts: the shell runs
    /// them by path.
    Command,
}

impl ScriptKind {
    /// Classify one specification entry
    ///
    /// The file system is consulted at call time, so a script created by an
    /// earlier entry of the same hook is picked up.
    #[must_use]
    pub fn classify(entry: &str) -> Self {
        let path = Path::new(entry);
        if path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION) && path.exists() {
            Self::Source(path.to_path_buf())
        } else {
            Self::Command
        }
    }
}

/// Internal event name under which a custom command's action is registered
#[must_use]
pub fn command_event(name: &str) -> String {
    format!("{name}:{COMMAND_LIFECYCLE_EVENT}")
}

/// How the host exposes a custom command to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDescriptor {
    /// Help text shown by the host
    pub usage: String,
    /// Lifecycle stages the host runs for the command
    pub lifecycle_events: Vec<String>,
}

impl CommandDescriptor {
    /// Describe a custom command bound to `spec`
    #[must_use]
    pub fn new(spec: &Specification) -> Self {
        Self {
            usage: format!("Run {spec}"),
            lifecycle_events: vec![COMMAND_LIFECYCLE_EVENT.to_string()],
        }
    }
}
