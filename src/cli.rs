// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `hotloop`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hotloop",
    version,
    about = "Rebuild and restart a program whenever its sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Project root to watch and build in.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: String,

    /// Path to a config file (TOML).
    ///
    /// If omitted, `Hotloop.toml` in the project root is used when present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Build tags passed to the build tool as `-tags <TAGS>`.
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Build tool to invoke (`<TOOL> build -o <artifact>`).
    #[arg(long, value_name = "TOOL")]
    pub build_tool: Option<String>,

    /// Quiet period in milliseconds before a burst of changes triggers a build.
    #[arg(long, value_name = "MS")]
    pub quiet_period_ms: Option<u64>,

    /// Watched file suffix (repeatable). Replaces the configured list.
    #[arg(long = "ext", value_name = "SUFFIX")]
    pub extensions: Vec<String>,

    /// Extra ignore regex matched against file names (repeatable).
    #[arg(long = "ignore", value_name = "REGEX")]
    pub ignore: Vec<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOTLOOP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve config and discover watched directories, but don't build.
    #[arg(long)]
    pub dry_run: bool,

    /// Arguments passed to the built program.
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
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
