// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{HotloopError, Result};
use crate::watch::discover::build_dir_excludes;
use crate::watch::filter::PathFilter;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::HotloopError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.watch, raw.build, raw.run))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_watch(cfg)?;
    validate_build(cfg)?;
    validate_patterns(cfg)?;
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.extensions.is_empty() {
        return Err(HotloopError::ConfigError(
            "[watch].extensions must list at least one suffix".to_string(),
        ));
    }
    if let Some(empty) = cfg.watch.extensions.iter().position(|e| e.trim().is_empty()) {
        return Err(HotloopError::ConfigError(format!(
            "[watch].extensions[{empty}] is empty"
        )));
    }
    if cfg.watch.quiet_period_ms == 0 {
        return Err(HotloopError::ConfigError(
            "[watch].quiet_period_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_build(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.tool.trim().is_empty() {
        return Err(HotloopError::ConfigError(
            "[build].tool must not be empty".to_string(),
        ));
    }
    if let Some(output) = &cfg.build.output {
        if output.trim().is_empty() || output.contains(['/', '\\']) {
            return Err(HotloopError::ConfigError(format!(
                "[build].output must be a bare file name (got {output:?})"
            )));
        }
    }
    Ok(())
}

/// Compile every regex and glob once so bad patterns fail at startup.
fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    PathFilter::new(cfg.watch.extensions.iter().cloned(), &cfg.watch.ignore)?;
    build_dir_excludes(&cfg.watch.exclude_dirs)?;
    Ok(())
}
