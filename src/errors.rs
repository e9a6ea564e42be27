// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Only configuration-class variants are expected to reach `main`; everything
//! that happens once the loop is running is logged and absorbed where it
//! occurs.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotloopError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid glob: {0}")]
    InvalidGlob(#[from] globset::Error),

    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to spawn {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a supervised process (pid {0}) is still running")]
    ProcessAlreadyRunning(u32),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HotloopError>;
