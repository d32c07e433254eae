//! Run hooks for lifecycle events

use clap::Args;
use owo_colors::OwoColorize;
use scriptable_core::Error;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// Run the hooks registered for one or more events
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Events to run, in order (e.g. `before:deploy:deploy`)
    #[arg(required = true, value_name = "EVENT")]
    pub events: Vec<String>,

    /// Fail when an event has no registered hook
    #[arg(long)]
    pub strict: bool,
}

impl Command for RunCommand {
    type Output = usize;

    /// Returns the number of events that had a hook
    fn execute(&self, context: &RuntimeContext) -> Result<usize> {
        let mut ran = 0;

        for event in &self.events {
            if context.scriptable.hook(event).is_none() {
                if self.strict {
                    return Err(Error::HookNotFound(event.clone()).into());
                }
                eprintln!("{} {}", "No hook registered for".yellow(), event.cyan());
                continue;
            }

            tracing::debug!(event = %event, "Running hook");
            context.scriptable.run_hook(event)?;
            ran += 1;
        }

        Ok(ran)
    }
}
