//! Logging configuration for the scriptable CLI
//!
//! Console output through tracing, plus an optional debug log file.

use crate::{Error, Result};
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events pass the default filter
const TARGETS: [&str; 3] = ["scriptable", "scriptable_engine", "scriptable_config"];

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging (and timestamps)
/// * `log_file` - Optional path to append debug logs to
///
/// `RUST_LOG` overrides the console filter.
///
/// # Examples
/// ```ignore
/// // Basic usage with info level
/// init(false, None)?;
///
/// // Verbose mode, also writing to a file
/// init(true, Some(Path::new("hooks.log")))?;
/// ```
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            let directives: Vec<String> = TARGETS
                .iter()
                .map(|target| format!("{target}={level}"))
                .collect();
            EnvFilter::try_new(directives.join(","))
        })
        .map_err(|e| Error::Message(format!("Invalid log filter: {e}")))?;

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_ansi(true);

    // No timestamps in normal mode
    let console_layer = if verbose {
        console.with_filter(env_filter).boxed()
    } else {
        console.without_time().with_filter(env_filter).boxed()
    };

    let file_layer = match log_file {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
