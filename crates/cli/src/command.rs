//! Command trait for scriptable CLI
//!
//! Every subcommand implements [`Command`], receiving the loaded
//! [`RuntimeContext`] instead of reloading the service itself.

use crate::common::RuntimeContext;
use crate::error::Result;

/// Trait for all scriptable subcommands
///
/// # Example
///
/// ```rust,ignore
/// use crate::command::Command;
/// use crate::common::RuntimeContext;
/// use crate::error::Result;
/// use clap::Args;
///
/// #[derive(Debug, Args)]
/// pub struct MyCommand {
///     #[arg(short, long)]
///     pub some_flag: bool,
/// }
///
/// impl Command for MyCommand {
///     type Output = ();
///
///     fn execute(&self, context: &RuntimeContext) -> Result<()> {
///         // Access the registry: context.scriptable
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` if a hook fails or output cannot be produced.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
