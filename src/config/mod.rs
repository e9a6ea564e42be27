// src/config/mod.rs

//! Configuration loading and validation for hotloop.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file and merge CLI overrides (`loader.rs`).
//! - Validate values and compile patterns up front (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_config};
pub use model::{BuildSection, ConfigFile, RawConfigFile, RunSection, WatchSection};
