//! Run custom commands

use clap::Args;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// Run a custom command declared under `scriptable.commands`
#[derive(Debug, Args)]
pub struct CustomCommand {
    /// Name of the custom command
    pub name: String,
}

impl Command for CustomCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        tracing::debug!(command = %self.name, "Running custom command");
        context.scriptable.run_command(&self.name)?;
        Ok(())
    }
}
