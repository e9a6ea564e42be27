// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use globset::GlobSet;
use serde::Deserialize;

use crate::errors::Result;
use crate::watch::debounce::DEFAULT_QUIET_PERIOD;
use crate::watch::discover::{build_dir_excludes, DEFAULT_EXCLUDE_DIRS};
use crate::watch::filter::{PathFilter, DEFAULT_EXTENSIONS, DEFAULT_IGNORE_PATTERNS};

/// Configuration exactly as read from TOML, before validation.
///
/// ```toml
/// [watch]
/// extensions = [".go"]
/// ignore = ['^\.#', '\.swp$', '~$', '\.tmp$']
/// exclude_dirs = ["*views", "*data"]
/// quiet_period_ms = 1000
///
/// [build]
/// tool = "go"
/// tags = "dev"
///
/// [run]
/// args = ["--port", "8080"]
/// env = { APP_ENV = "dev" }
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub run: RunSection,
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)`, so every
/// pattern in here is known to compile.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub build: BuildSection,
    pub run: RunSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(watch: WatchSection, build: BuildSection, run: RunSection) -> Self {
        Self { watch, build, run }
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.watch.quiet_period_ms)
    }

    pub fn path_filter(&self) -> Result<PathFilter> {
        PathFilter::new(self.watch.extensions.iter().cloned(), &self.watch.ignore)
    }

    pub fn dir_excludes(&self) -> Result<GlobSet> {
        build_dir_excludes(&self.watch.exclude_dirs)
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// File-name suffixes that count as source files.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Regexes matched against file names; a match means "not a real edit".
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Globs matched against directory names; matching directories are not
    /// watched or descended into.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Quiet period before a burst of changes triggers a build.
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_ignore() -> Vec<String> {
    DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect()
}

fn default_exclude_dirs() -> Vec<String> {
    DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect()
}

fn default_quiet_period_ms() -> u64 {
    DEFAULT_QUIET_PERIOD.as_millis() as u64
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore: default_ignore(),
            exclude_dirs: default_exclude_dirs(),
            quiet_period_ms: default_quiet_period_ms(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Build tool, invoked as `<tool> build -o <artifact> [-tags <tags>]`.
    #[serde(default = "default_tool")]
    pub tool: String,

    #[serde(default)]
    pub tags: Option<String>,

    /// Artifact name; defaults to the project directory's name.
    #[serde(default)]
    pub output: Option<String>,

    /// Extra environment for the build tool.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_tool() -> String {
    "go".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            tags: None,
            output: None,
            env: BTreeMap::new(),
        }
    }
}

/// `[run]` section: how the built program is started.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,
}
