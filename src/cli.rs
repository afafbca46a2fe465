// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `taskfleet`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskfleet",
    version,
    about = "Launch batches of container tasks under provider rate limits and watch what is running.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Taskfleet.toml` in the current working directory if it
    /// exists, otherwise built-in defaults.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKFLEET_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Launch N tasks of one task definition and stream progress.
    Launch(LaunchArgs),
    /// Show running tasks grouped by task-definition family.
    Fleet(FleetArgs),
    /// Print the effective configuration.
    Config,
}

#[derive(Debug, Clone, Args)]
pub struct LaunchArgs {
    /// Task definition (family, family:revision or full ARN).
    #[arg(long, short = 't', value_name = "TASK_DEF")]
    pub task_definition: String,

    /// Number of tasks to launch.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,

    /// Print the batch plan without launching anything.
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Args)]
pub struct FleetArgs {
    /// Keep polling every `[fleet].poll_interval` until Ctrl-C.
    #[arg(long)]
    pub watch: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

/// How progress lines and fleet views are printed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
