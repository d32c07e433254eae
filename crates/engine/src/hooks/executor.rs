//! Script executor
//!
//! Runs one specification entry to completion: source scripts are evaluated
//! in-process through [`ScriptContext`], everything else goes to the platform
//! shell with the configured standard streams.

use super::config::ScriptKind;
use super::context::ScriptContext;
use super::streams::{Role, Stream};
use crate::state::SharedValue;
use indexmap::IndexMap;
use scriptable_core::platform::CURRENT_PLATFORM;
use scriptable_core::{Error, Result};
use std::path::Path;
use std::time::Duration;

/// Environment variable carrying the event name into subprocesses
pub const EVENT_ENV_VAR: &str = "SCRIPTABLE_EVENT";

/// Executes single specification entries
///
/// Holds the standard streams, the output switches and the shared host
/// objects injected into source scripts.
#[derive(Debug, Clone)]
pub struct ScriptExecutor {
    stdin: Stream,
    stdout: Stream,
    stderr: Stream,
    /// Where announcements (`Running command: ...`) are written
    console: Stream,
    show_commands: bool,
    /// `None` = wait forever
    timeout: Option<Duration>,
    host: SharedValue,
    options: SharedValue,
    /// Extra environment variables for subprocesses, on top of the inherited ones
    env_vars: IndexMap<String, String>,
}

impl Default for ScriptExecutor {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ScriptExecutor {
    /// Create a builder for configuring a `ScriptExecutor`
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let executor = ScriptExecutor::builder()
    ///     .host(host_state)
    ///     .stdout(Stream::append_to("hooks.log")?)
    ///     .show_commands(false)
    ///     .build();
    ///
    /// executor.execute("echo hello", "deploy")?;
    /// ```
    pub fn builder() -> ScriptExecutorBuilder {
        ScriptExecutorBuilder::default()
    }

    /// Run one specification entry for `event`
    ///
    /// Blocks until the subprocess exits or the script (including any
    /// deferred result) settles.
    #[tracing::instrument(skip(self), fields(kind = tracing::field::Empty))]
    pub fn execute(&self, entry: &str, event: &str) -> Result<()> {
        match ScriptKind::classify(entry) {
            ScriptKind::Source(path) => {
                tracing::Span::current().record("kind", "script");
                self.run_script_file(&path, event)
            }
            ScriptKind::Command => {
                tracing::Span::current().record("kind", "command");
                self.run_command(entry, event)
            }
        }
    }

    /// Run a shell command with the configured streams
    ///
    /// Any failure (spawn error, non-zero exit, timeout) becomes the same terse
    /// `CommandExecution` error. The shell's own diagnostic is only visible on
    /// the stderr stream.
    fn run_command(&self, command: &str, event: &str) -> Result<()> {
        self.announce(&format!("Running command: {command}"));

        let (shell, flag) = CURRENT_PLATFORM.shell;
        let mut expr = duct::cmd(shell, [flag, command]).env(EVENT_ENV_VAR, event);
        for (key, value) in &self.env_vars {
            expr = expr.env(key, value);
        }

        let outcome = self.attach_streams(expr).and_then(|expr| match self.timeout {
            Some(limit) => {
                let handle = expr.start()?;
                match handle.wait_timeout(limit)? {
                    Some(_output) => Ok(()),
                    None => {
                        tracing::warn!(timeout_secs = limit.as_secs(), "Command timed out, killing it");
                        handle.kill()?;
                        Err(std::io::Error::new(
                            std::io::ErrorKind::TimedOut,
                            format!("timed out after {} seconds", limit.as_secs()),
                        ))
                    }
                }
            }
            None => expr.run().map(|_| ()),
        });

        outcome.map_err(|e| {
            tracing::debug!(error = %e, "Command failed");
            Error::command(command)
        })
    }

    /// Evaluate a source script in a fresh isolated context
    ///
    /// Script errors propagate with the engine error intact.
    fn run_script_file(&self, path: &Path, event: &str) -> Result<()> {
        self.announce(&format!("Running script file: {}", path.display()));

        ScriptContext {
            path,
            event,
            host: &self.host,
            options: &self.options,
            stdout: &self.stdout,
            stderr: &self.stderr,
            timeout: self.timeout,
        }
        .run()
        .map(|_| ())
    }

    fn attach_streams(&self, expr: duct::Expression) -> std::io::Result<duct::Expression> {
        let expr = self.stdin.attach_stdin(expr)?;
        let expr = self.stdout.attach_stdout(expr)?;
        self.stderr.attach_stderr(expr)
    }

    fn announce(&self, line: &str) {
        if !self.show_commands {
            return;
        }
        if let Err(e) = self.console.write_line(Role::Stdout, line) {
            tracing::warn!(error = %e, "Failed to write announcement");
        }
    }

    /// The host state object shared with scripts
    pub fn host(&self) -> &SharedValue {
        &self.host
    }

    /// The invocation options shared with scripts
    pub fn options(&self) -> &SharedValue {
        &self.options
    }

    /// Whether entries are announced before running
    pub fn shows_commands(&self) -> bool {
        self.show_commands
    }

    /// Current stdout stream
    pub fn stdout(&self) -> &Stream {
        &self.stdout
    }

    /// Current stderr stream
    pub fn stderr(&self) -> &Stream {
        &self.stderr
    }

    /// Configured timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn set_stdin(&mut self, stream: Stream) {
        self.stdin = stream;
    }

    pub(crate) fn set_stdout(&mut self, stream: Stream) {
        self.stdout = stream;
    }

    pub(crate) fn set_stderr(&mut self, stream: Stream) {
        self.stderr = stream;
    }

    pub(crate) fn set_console(&mut self, stream: Stream) {
        self.console = stream;
    }
}

// ======================================================================
// ScriptExecutorBuilder
// ======================================================================

/// Builder for creating a `ScriptExecutor`
///
/// Defaults: inherited streams, announcements on, no timeout, empty host
/// state and options.
#[derive(Debug, Default)]
pub struct ScriptExecutorBuilder {
    stdin: Stream,
    stdout: Stream,
    stderr: Stream,
    console: Stream,
    hide_commands: bool,
    timeout: Option<Duration>,
    host: Option<SharedValue>,
    options: Option<SharedValue>,
    env_vars: IndexMap<String, String>,
}

impl ScriptExecutorBuilder {
    /// Set the stdin stream for subprocesses
    pub fn stdin(mut self, stream: Stream) -> Self {
        self.stdin = stream;
        self
    }

    /// Set the stdout stream for subprocesses and script `print`
    pub fn stdout(mut self, stream: Stream) -> Self {
        self.stdout = stream;
        self
    }

    /// Set the stderr stream for subprocesses and script `debug`
    pub fn stderr(mut self, stream: Stream) -> Self {
        self.stderr = stream;
        self
    }

    /// Set where announcements are written
    pub fn console(mut self, stream: Stream) -> Self {
        self.console = stream;
        self
    }

    /// Announce each entry before running it (default: on)
    pub fn show_commands(mut self, show: bool) -> Self {
        self.hide_commands = !show;
        self
    }

    /// Kill commands and fail deferred scripts that run longer than `timeout`
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share the host state object with scripts
    pub fn host(mut self, host: SharedValue) -> Self {
        self.host = Some(host);
        self
    }

    /// Share the parsed invocation options with scripts
    pub fn options(mut self, options: SharedValue) -> Self {
        self.options = Some(options);
        self
    }

    /// Add an environment variable for all subprocesses
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let executor = ScriptExecutor::builder()
    ///     .env("DEPLOY_ENV", "production")
    ///     .build();
    /// ```
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Build the executor
    pub fn build(self) -> ScriptExecutor {
        ScriptExecutor {
            stdin: self.stdin,
            stdout: self.stdout,
            stderr: self.stderr,
            console: self.console,
            show_commands: !self.hide_commands,
            timeout: self.timeout,
            host: self.host.unwrap_or_default(),
            options: self.options.unwrap_or_default(),
            env_vars: self.env_vars,
        }
    }
}
