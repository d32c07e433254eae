//! Hook registry
//!
//! Turns the normalized `scriptable` configuration into one action per
//! event and one action plus descriptor per custom command.

use super::config::{CommandDescriptor, command_event};
use super::executor::ScriptExecutor;
use super::streams::Stream;
use crate::state::SharedValue;
use indexmap::IndexMap;
use scriptable_config::{OutputSettings, ScriptableConfig, ServiceDescription, Specification};
use scriptable_core::{Error, Result};
use std::sync::Arc;

/// A zero-argument action bound to one event
///
/// Running it executes every entry of its specification strictly in order
/// and stops at the first failure.
#[derive(Debug, Clone)]
pub struct HookAction {
    event: String,
    spec: Specification,
    executor: Arc<ScriptExecutor>,
}

impl HookAction {
    /// Event this action is registered under
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Specification the action runs
    pub fn specification(&self) -> &Specification {
        &self.spec
    }

    /// Run all entries sequentially
    #[tracing::instrument(skip(self), fields(event = %self.event, entries = self.spec.entries().len()))]
    pub fn run(&self) -> Result<()> {
        for (index, entry) in self.spec.entries().iter().enumerate() {
            let span = tracing::info_span!("hook_execution", event = %self.event, index, entry = %entry);
            let _guard = span.enter();

            let start = std::time::Instant::now();
            tracing::debug!("Starting hook entry");

            let result = self.executor.execute(entry, &self.event);

            let elapsed = start.elapsed();
            match &result {
                Ok(()) => tracing::debug!(elapsed_ms = elapsed.as_millis(), "Hook entry completed"),
                Err(e) => tracing::error!(elapsed_ms = elapsed.as_millis(), error = %e, "Hook entry failed"),
            }
            result?;
        }
        Ok(())
    }
}

/// Registered hooks and custom commands of one service
///
/// # Examples
///
/// ```ignore
/// let service = ServiceDescription::load("serverless.yml")?;
/// let host = SharedValue::from_json(&json!({ "service": service.document() }))?;
/// let scriptable = Scriptable::from_service(&service, host.clone(), SharedValue::empty());
///
/// scriptable.run_hook("before:package:createDeploymentArtifacts")?;
/// scriptable.run_command("migrate")?;
/// ```
#[derive(Debug, Clone)]
pub struct Scriptable {
    output: OutputSettings,
    executor: Arc<ScriptExecutor>,
    hooks: IndexMap<String, HookAction>,
    commands: IndexMap<String, CommandDescriptor>,
}

impl Scriptable {
    /// Register hooks and commands from a normalized configuration
    ///
    /// Never fails: malformed entries were already dropped while normalizing.
    pub fn new(config: &ScriptableConfig, host: SharedValue, options: SharedValue) -> Self {
        let mut builder = ScriptExecutor::builder()
            .host(host)
            .options(options)
            .show_commands(config.output.show_commands)
            .timeout(config.timeout);

        if !config.output.show_stdout_output {
            tracing::info!("Not showing command output because showStdoutOutput is false");
            builder = builder.stdout(Stream::Null);
        }
        if !config.output.show_stderr_output {
            tracing::info!("Not showing command error output because showStderrOutput is false");
            builder = builder.stderr(Stream::Null);
        }

        let executor = Arc::new(builder.build());
        let mut hooks = IndexMap::with_capacity(config.hooks.len() + config.commands.len());
        let mut commands = IndexMap::with_capacity(config.commands.len());

        for (event, spec) in &config.hooks {
            tracing::debug!(event = %event, spec = %spec, "Registering hook");
            hooks.insert(
                event.clone(),
                HookAction {
                    event: event.clone(),
                    spec: spec.clone(),
                    executor: Arc::clone(&executor),
                },
            );
        }

        for (name, spec) in &config.commands {
            let event = command_event(name);
            tracing::debug!(command = %name, event = %event, "Registering custom command");
            hooks.insert(
                event.clone(),
                HookAction {
                    event,
                    spec: spec.clone(),
                    executor: Arc::clone(&executor),
                },
            );
            commands.insert(name.clone(), CommandDescriptor::new(spec));
        }

        tracing::debug!(hooks = hooks.len(), commands = commands.len(), "Registry ready");

        Self {
            output: config.output,
            executor,
            hooks,
            commands,
        }
    }

    /// Register hooks and commands from a service description's `custom` namespace
    pub fn from_service(service: &ServiceDescription, host: SharedValue, options: SharedValue) -> Self {
        Self::new(&service.scriptable_config(), host, options)
    }

    /// Resolved output switches
    pub fn output(&self) -> &OutputSettings {
        &self.output
    }

    /// The executor shared by all actions
    pub fn executor(&self) -> &ScriptExecutor {
        &self.executor
    }

    /// Action registered for `event`
    pub fn hook(&self, event: &str) -> Option<&HookAction> {
        self.hooks.get(event)
    }

    /// Descriptor of the custom command `name`
    pub fn command(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    /// All registered actions in declaration order, custom commands last
    pub fn hooks(&self) -> impl Iterator<Item = (&str, &HookAction)> {
        self.hooks.iter().map(|(event, action)| (event.as_str(), action))
    }

    /// All custom command descriptors in declaration order
    pub fn commands(&self) -> impl Iterator<Item = (&str, &CommandDescriptor)> {
        self.commands.iter().map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    /// Run the action registered for `event`
    pub fn run_hook(&self, event: &str) -> Result<()> {
        self.hook(event)
            .ok_or_else(|| Error::HookNotFound(event.to_string()))?
            .run()
    }

    /// Run the custom command `name`
    pub fn run_command(&self, name: &str) -> Result<()> {
        if !self.commands.contains_key(name) {
            return Err(Error::CommandNotFound(name.to_string()));
        }
        self.run_hook(&command_event(name))
    }

    /// Replace the stdin stream of all actions
    pub fn set_stdin(&mut self, stream: Stream) {
        Arc::make_mut(&mut self.executor).set_stdin(stream);
        self.rebind();
    }

    /// Replace the stdout stream of all actions
    pub fn set_stdout(&mut self, stream: Stream) {
        Arc::make_mut(&mut self.executor).set_stdout(stream);
        self.rebind();
    }

    /// Replace the stderr stream of all actions
    pub fn set_stderr(&mut self, stream: Stream) {
        Arc::make_mut(&mut self.executor).set_stderr(stream);
        self.rebind();
    }

    /// Replace where announcements are written
    pub fn set_console(&mut self, stream: Stream) {
        Arc::make_mut(&mut self.executor).set_console(stream);
        self.rebind();
    }

    fn rebind(&mut self) {
        for action in self.hooks.values_mut() {
            action.executor = Arc::clone(&self.executor);
        }
    }
}
