//! Scriptable CLI library
//!
//! A stand-in host for service descriptions: loads the service file,
//! registers its `scriptable` hooks and custom commands, and runs them on
//! request. Kept as a library so the commands can be tested directly.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use command::Command;
use common::RuntimeContext;

/// Scriptable - run shell commands and scripts on service lifecycle events
#[derive(Parser)]
#[command(name = "scriptable")]
#[command(about = "Run scriptable hooks and custom commands of a service")]
#[command(version)]
#[command(long_about = "Run scriptable hooks and custom commands of a service

Hooks are declared under `custom.scriptable.hooks` (or the deprecated
`custom.scriptHooks`) of the service description. Each entry is a shell
command or a path to a `.rhai` script; scripts see the service document as
`host.service` and the `-o` options as `options`.")]
pub struct Cli {
    /// Path to the service description (YAML, JSON or TOML)
    #[arg(
        long,
        env = "SCRIPTABLE_SERVICE",
        value_name = "FILE",
        default_value = "serverless.yml"
    )]
    pub service: PathBuf,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "SCRIPTABLE_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Invocation option passed to scripts as `options.KEY` (repeatable)
    #[arg(
        short = 'o',
        long = "option",
        value_name = "KEY=VALUE",
        value_parser = common::parse_option
    )]
    pub options: Vec<(String, Value)>,

    /// Print the host state as JSON after running
    #[arg(long)]
    pub print_state: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for scriptable CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Run the hooks registered for one or more events, in order
    #[command(long_about = "Run the hooks registered for one or more events, in order

Examples:
  • scriptable run before:package:createDeploymentArtifacts
      → Run a single lifecycle hook

  • scriptable run before:deploy:deploy after:deploy:deploy
      → Run several hooks, stopping at the first failure

  • scriptable -o stage=prod run deploy --strict
      → Fail if no hook is registered for an event")]
    Run(cmd::run::RunCommand),

    /// Run a custom command declared under `scriptable.commands`
    #[command(name = "command")]
    Custom(cmd::custom::CustomCommand),

    /// List registered hooks and custom commands
    List(cmd::list::ListCommand),
}

/// Main entry point for the CLI application
pub fn run(cli: Cli) -> Result<()> {
    scriptable_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let context = RuntimeContext::load(&cli.service, cli.options)
        .with_context(|| format!("Failed to prepare service {}", cli.service.display()))?;

    execute_command(cli.command, &context)?;

    if cli.print_state {
        let state = context.host_state()?;
        println!(
            "{}",
            serde_json::to_string_pretty(&state).context("Failed to serialize host state")?
        );
    }

    Ok(())
}

fn execute_command(command: Commands, context: &RuntimeContext) -> Result<()> {
    match command {
        Commands::Run(run_cmd) => {
            run_cmd.execute(context)?;
        }
        Commands::Custom(custom_cmd) => {
            custom_cmd.execute(context)?;
        }
        Commands::List(list_cmd) => {
            list_cmd.execute(context)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "scriptable",
            "--service",
            "svc.json",
            "-o",
            "stage=prod",
            "--option",
            "memory=512",
            "--print-state",
            "run",
            "deploy",
        ])
        .unwrap();

        assert_eq!(cli.service, PathBuf::from("svc.json"));
        assert!(cli.print_state);
        assert_eq!(
            cli.options,
            [
                ("stage".to_string(), Value::from("prod")),
                ("memory".to_string(), Value::from(512)),
            ]
        );
        assert!(matches!(cli.command, Commands::Run(ref run) if run.events == ["deploy"]));
    }

    #[test]
    fn test_default_service_file() {
        let cli = Cli::try_parse_from(["scriptable", "list"]).unwrap();
        if std::env::var_os("SCRIPTABLE_SERVICE").is_none() {
            assert_eq!(cli.service, PathBuf::from("serverless.yml"));
        }
    }

    #[test]
    fn test_command_subcommand_name() {
        let cli = Cli::try_parse_from(["scriptable", "command", "migrate"]).unwrap();
        assert!(matches!(cli.command, Commands::Custom(ref c) if c.name == "migrate"));
    }

    #[test]
    fn test_run_requires_event() {
        assert!(Cli::try_parse_from(["scriptable", "run"]).is_err());
    }
}
