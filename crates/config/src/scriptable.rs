//! Hook configuration normalization
//!
//! The host service description carries hook configuration in one or both of
//! two shapes under its `custom` namespace:
//!
//! ```yaml
//! custom:
//!   # legacy shape: events and output switches side by side
//!   scriptHooks:
//!     showCommands: false
//!     before:package:createDeploymentArtifacts: npm run build
//!
//!   # current shape
//!   scriptable:
//!     showStdoutOutput: false
//!     hooks:
//!       before:deploy:deploy:
//!         - echo one
//!         - scripts/tag.rhai
//!     commands:
//!       migrate: ./migrate.sh
//! ```
//!
//! [`ScriptableConfig::from_custom`] folds both into a single normalized form.
//! Malformed entries are skipped with a warning; configuration never fails.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Legacy namespace under `custom`
pub const LEGACY_NAMESPACE: &str = "scriptHooks";

/// Current namespace under `custom`
pub const NAMESPACE: &str = "scriptable";

const SHOW_COMMANDS: &str = "showCommands";
const SHOW_STDOUT_OUTPUT: &str = "showStdoutOutput";
const SHOW_STDERR_OUTPUT: &str = "showStderrOutput";
const TIMEOUT: &str = "timeout";

/// Keys of the legacy shape that are switches, not events
const RESERVED_KEYS: [&str; 3] = [SHOW_COMMANDS, SHOW_STDOUT_OUTPUT, SHOW_STDERR_OUTPUT];

/// One hook or command specification
///
/// Either a single string (a script path or a literal shell command) or an
/// ordered list of them. List order is execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Specification {
    /// A single script path or shell command
    Single(String),
    /// Several entries run one after another
    Sequence(Vec<String>),
}

impl Specification {
    /// Build a specification from a raw configuration value
    ///
    /// Strings and lists of strings are accepted. Non-string list members are
    /// dropped and anything else yields `None`, each with a warning.
    pub fn from_value(name: &str, value: &Value) -> Option<Self> {
        match value {
            Value::String(entry) => Some(Self::Single(entry.clone())),
            Value::Array(items) => {
                let entries = items
                    .iter()
                    .filter_map(|item| {
                        if let Value::String(entry) = item {
                            Some(entry.clone())
                        } else {
                            tracing::warn!(
                                name = %name,
                                entry = %item,
                                "Ignoring non-string entry in hook specification"
                            );
                            None
                        }
                    })
                    .collect();
                Some(Self::Sequence(entries))
            }
            other => {
                tracing::warn!(
                    name = %name,
                    value = %other,
                    "Ignoring hook specification that is neither a string nor a list"
                );
                None
            }
        }
    }

    /// The entries to run, in order
    #[must_use]
    pub fn entries(&self) -> &[String] {
        match self {
            Self::Single(entry) => std::slice::from_ref(entry),
            Self::Sequence(entries) => entries,
        }
    }

    /// Check if there is nothing to run
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entries().join(","))
    }
}

/// Resolved output switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputSettings {
    /// Announce each command or script before running it
    pub show_commands: bool,
    /// Forward stdout of commands and scripts
    pub show_stdout_output: bool,
    /// Forward stderr of commands and scripts
    pub show_stderr_output: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            show_commands: true,
            show_stdout_output: true,
            show_stderr_output: true,
        }
    }
}

/// Normalized hook configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScriptableConfig {
    /// Output switches
    pub output: OutputSettings,

    /// Per-command timeout (`None` = wait forever)
    pub timeout: Option<Duration>,

    /// Lifecycle event → specification, in declared order
    pub hooks: IndexMap<String, Specification>,

    /// Custom command name → specification, in declared order
    pub commands: IndexMap<String, Specification>,

    /// Whether the deprecated `scriptHooks` namespace was present
    pub uses_legacy: bool,
}

impl ScriptableConfig {
    /// Normalize the `custom` namespace of a service description
    ///
    /// `None` (no custom namespace at all) yields an empty configuration.
    pub fn from_custom(custom: Option<&Value>) -> Self {
        let legacy = custom
            .and_then(|c| c.get(LEGACY_NAMESPACE))
            .and_then(|v| as_mapping(LEGACY_NAMESPACE, v));
        let current = custom
            .and_then(|c| c.get(NAMESPACE))
            .and_then(|v| as_mapping(NAMESPACE, v));

        if legacy.is_some() {
            tracing::warn!(
                "custom.{LEGACY_NAMESPACE} is deprecated, move hooks to custom.{NAMESPACE}.hooks"
            );
        }

        let flag = |key: &str| {
            let value = first_defined([
                current.and_then(|c| c.get(key)),
                legacy.and_then(|l| l.get(key)),
            ]);
            !is_false(value)
        };

        let output = OutputSettings {
            show_commands: flag(SHOW_COMMANDS),
            show_stdout_output: flag(SHOW_STDOUT_OUTPUT),
            show_stderr_output: flag(SHOW_STDERR_OUTPUT),
        };

        // Current shape wins on collision; an overridden key keeps its legacy position
        let mut hooks = IndexMap::new();
        for source in [legacy, current.and_then(|c| member_object(c, "hooks"))]
            .into_iter()
            .flatten()
        {
            for (event, value) in source {
                if RESERVED_KEYS.contains(&event.as_str()) {
                    continue;
                }
                if let Some(spec) = Specification::from_value(event, value) {
                    hooks.insert(event.clone(), spec);
                }
            }
        }

        let commands = current
            .and_then(|c| member_object(c, "commands"))
            .map(|commands| {
                commands
                    .iter()
                    .filter_map(|(name, value)| {
                        Specification::from_value(name, value).map(|spec| (name.clone(), spec))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let timeout = current
            .and_then(|c| c.get(TIMEOUT))
            .and_then(|value| {
                let seconds = value.as_u64();
                if seconds.is_none() && !value.is_null() {
                    tracing::warn!(value = %value, "Ignoring invalid {NAMESPACE}.{TIMEOUT}");
                }
                seconds
            })
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs);

        Self {
            output,
            timeout,
            hooks,
            commands,
            uses_legacy: legacy.is_some(),
        }
    }

    /// Check if neither hooks nor commands are configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty() && self.commands.is_empty()
    }
}

/// Return the first value that is defined
///
/// Candidates are scanned in precedence order. An explicit `null` counts as
/// defined; only a missing value (`None`) is skipped.
pub fn first_defined<T>(candidates: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    candidates.into_iter().flatten().next()
}

/// Check if a configuration switch is explicitly turned off
///
/// Only falsy values count: `false`, numeric zero and the empty string.
/// A missing value or `null` means "not configured", which is not false.
pub fn is_false(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n == 0.0),
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

type Mapping = serde_json::Map<String, Value>;

fn member_object<'a>(parent: &'a Mapping, key: &str) -> Option<&'a Mapping> {
    parent.get(key).and_then(|v| as_mapping(key, v))
}

fn as_mapping<'a>(key: &str, value: &'a Value) -> Option<&'a Mapping> {
    let object = value.as_object();
    if object.is_none() && !value.is_null() {
        tracing::warn!(key = %key, "Ignoring '{key}': expected a mapping");
    }
    object
}
