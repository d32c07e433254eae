//! Common utilities and types shared across CLI commands

use crate::error::CommandError;
use anyhow::{Context, Result};
use scriptable_config::ServiceDescription;
use scriptable_engine::{Scriptable, SharedValue};
use serde_json::{Map, Value, json};
use std::path::Path;
use std::sync::Arc;

/// Runtime context for command execution
///
/// Holds the loaded service, the host state handed to scripts as `host`,
/// the invocation options handed to scripts as `options`, and the registry
/// built from the service's `custom` namespace.
///
/// # Examples
///
/// ```no_run
/// use scriptable::common::RuntimeContext;
/// use std::path::Path;
///
/// let context = RuntimeContext::load(Path::new("serverless.yml"), Vec::new())?;
/// context.scriptable.run_hook("before:deploy:deploy")?;
/// println!("{}", context.host_state()?);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Clone)]
pub struct RuntimeContext {
    /// The parsed service description
    pub service: Arc<ServiceDescription>,
    /// Host state: `{ "service": <document> }`
    pub host: SharedValue,
    /// Invocation options
    pub options: SharedValue,
    /// Registered hooks and custom commands
    pub scriptable: Scriptable,
}

impl RuntimeContext {
    /// Load the service file and register its hooks
    pub fn load(service_path: &Path, options: Vec<(String, Value)>) -> Result<Self> {
        let service = ServiceDescription::load(service_path)?;
        Self::from_service(service, options)
    }

    /// Register the hooks of an already loaded service
    pub fn from_service(service: ServiceDescription, options: Vec<(String, Value)>) -> Result<Self> {
        let host = SharedValue::from_json(&json!({ "service": service.document() }))
            .context("Failed to share host state")?;

        let options: Map<String, Value> = options.into_iter().collect();
        let options =
            SharedValue::from_json(&Value::Object(options)).context("Failed to share options")?;

        let scriptable = Scriptable::from_service(&service, host.clone(), options.clone());
        tracing::debug!(
            hooks = scriptable.hooks().count(),
            commands = scriptable.commands().count(),
            "Service loaded"
        );

        Ok(Self {
            service: Arc::new(service),
            host,
            options,
            scriptable,
        })
    }

    /// Snapshot of the host state after scripts ran
    pub fn host_state(&self) -> Result<Value> {
        self.host.to_json().context("Failed to read host state")
    }
}

/// Parse one `KEY=VALUE` option
///
/// Numbers and booleans become JSON scalars; anything else stays a string.
/// A bare `KEY` is a flag and becomes `true`.
pub fn parse_option(raw: &str) -> std::result::Result<(String, Value), CommandError> {
    let (key, value) = match raw.split_once('=') {
        Some((key, value)) => (key.trim(), Some(value)),
        None => (raw.trim(), None),
    };
    if key.is_empty() {
        return Err(CommandError::InvalidOption(raw.to_string()));
    }

    let value = match value {
        None => Value::Bool(true),
        Some(value) => match serde_json::from_str::<Value>(value) {
            Ok(scalar @ (Value::Bool(_) | Value::Number(_))) => scalar,
            _ => Value::String(value.to_string()),
        },
    };

    Ok((key.to_string(), value))
}
