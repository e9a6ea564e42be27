// src/logging.rs

//! `tracing` subscriber setup.
//!
//! Level selection, highest priority first:
//! 1. `--log-level`
//! 2. `HOTLOOP_LOG`, which takes full `EnvFilter` directives
//!    (`debug`, `hotloop::watch=trace,info`, ...)
//! 3. `info`
//!
//! Everything is written to stderr. Stdout belongs to the build tool and the
//! supervised program.

use anyhow::Result;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV_VAR: &str = "HOTLOOP_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(cli_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

/// Filter for the given CLI level, falling back to [`LOG_ENV_VAR`].
///
/// Unparseable directives in the environment are skipped.
pub fn build_filter(cli_level: Option<LogLevel>) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::builder()
            .with_default_directive(level_filter(level).into())
            .parse_lossy(""),
        None => EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .with_env_var(LOG_ENV_VAR)
            .from_env_lossy(),
    }
}

pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}
