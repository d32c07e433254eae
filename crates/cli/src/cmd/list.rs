//! List registered hooks and custom commands

use clap::{Args, ValueEnum};
use owo_colors::OwoColorize;
use scriptable_config::{OutputSettings, Specification};
use scriptable_engine::CommandDescriptor;
use serde::Serialize;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// Output format for `list`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human readable
    #[default]
    Text,
    /// Machine readable JSON
    Json,
}

/// List registered hooks and custom commands
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = ListFormat::Text)]
    pub format: ListFormat,
}

/// Serializable view of the registry
#[derive(Debug, Serialize)]
pub struct Listing<'a> {
    /// Resolved output switches
    pub output: &'a OutputSettings,
    /// Event name to specification, in registration order
    pub hooks: Vec<HookListing<'a>>,
    /// Custom command name to descriptor
    pub commands: Vec<CommandListing<'a>>,
}

/// One registered hook
#[derive(Debug, Serialize)]
pub struct HookListing<'a> {
    /// Event name
    pub event: &'a str,
    /// Entries run for the event
    pub specification: &'a Specification,
}

/// One custom command
#[derive(Debug, Serialize)]
pub struct CommandListing<'a> {
    /// Command name
    pub name: &'a str,
    /// How the host exposes it
    #[serde(flatten)]
    pub descriptor: &'a CommandDescriptor,
}

impl<'a> Listing<'a> {
    /// Collect the registry of `context`
    pub fn new(context: &'a RuntimeContext) -> Self {
        let scriptable = &context.scriptable;
        Self {
            output: scriptable.output(),
            hooks: scriptable
                .hooks()
                .map(|(event, action)| HookListing {
                    event,
                    specification: action.specification(),
                })
                .collect(),
            commands: scriptable
                .commands()
                .map(|(name, descriptor)| CommandListing { name, descriptor })
                .collect(),
        }
    }
}

impl Command for ListCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let listing = Listing::new(context);

        match self.format {
            ListFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            }
            ListFormat::Text => {
                if let Some(path) = context.service.path() {
                    println!("Service: {}", path.display().cyan());
                }

                if listing.hooks.is_empty() && listing.commands.is_empty() {
                    println!("{}", "No hooks configured.".yellow());
                    return Ok(());
                }

                println!("{} ({} hooks)", "Hooks:".bold(), listing.hooks.len());
                for hook in &listing.hooks {
                    println!("  • {}", hook.event.green());
                    for entry in hook.specification.entries() {
                        println!("      {}", entry.dimmed());
                    }
                }

                println!(
                    "\n{} ({} commands)",
                    "Commands:".bold(),
                    listing.commands.len()
                );
                for command in &listing.commands {
                    println!("  • {} {}", command.name.green(), command.descriptor.usage.dimmed());
                }
            }
        }

        Ok(())
    }
}
