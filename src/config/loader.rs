// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};

/// Config file looked up in the project root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Hotloop.toml";

/// Load a configuration file and return the raw, unvalidated `RawConfigFile`.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs.read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from disk and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&RealFileSystem, path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Default config location for a project root.
pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(DEFAULT_CONFIG_FILE)
}

/// Build the effective configuration for a run.
///
/// - An explicit `--config` must exist.
/// - Otherwise `Hotloop.toml` in `root` is used if present, or built-in
///   defaults if not.
/// - CLI flags are applied on top, and the result is validated as a whole.
pub fn resolve_config(fs: &dyn FileSystem, root: &Path, args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(fs, path)?,
        None => {
            let path = default_config_path(root);
            if fs.is_file(&path) {
                debug!(path = ?path, "using project config file");
                load_from_path(fs, &path)?
            } else {
                debug!("no config file; using defaults");
                RawConfigFile::default()
            }
        }
    };

    apply_cli_overrides(&mut raw, args);
    ConfigFile::try_from(raw)
}

fn apply_cli_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if let Some(tags) = &args.tags {
        raw.build.tags = Some(tags.clone());
    }
    if let Some(tool) = &args.build_tool {
        raw.build.tool = tool.clone();
    }
    if let Some(ms) = args.quiet_period_ms {
        raw.watch.quiet_period_ms = ms;
    }
    if !args.extensions.is_empty() {
        raw.watch.extensions = args.extensions.clone();
    }
    raw.watch.ignore.extend(args.ignore.iter().cloned());
    if !args.args.is_empty() {
        raw.run.args = args.args.clone();
    }
}
