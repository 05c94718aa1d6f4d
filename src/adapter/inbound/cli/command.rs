//! Command-line interface definitions.
//!
//! Defines the CLI structure for `upsdash` using `clap`: watching the live
//! channel, fetching the status once, and inspecting configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Realtime UPS telemetry client
#[derive(Parser, Debug)]
#[command(name = "upsdash")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "upsdash.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow the realtime channel until interrupted
    Watch(WatchArgs),

    /// Fetch the current UPS status once
    Status,

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `upsdash watch`.
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Exit after the first snapshot arrives
    #[arg(long)]
    pub once: bool,
}

/// Subcommands for `upsdash config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate the configuration file.
    Validate,
}
