// src/watch/filter.rs

use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::errors::{HotloopError, Result};
use crate::watch::path_utils::file_name_str;

/// Default watched suffixes.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".go"];

/// Default ignore patterns, matched against the file name only.
///
/// - `^\.#`   editor lock files (`.#main.go`)
/// - `\.swp$` vim swap files (`main.go.swp`, `.main.go.swp`)
/// - `~$`     backup files (`main.go~`)
/// - `\.tmp$` temp files
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[r"^\.#", r"\.swp$", r"~$", r"\.tmp$"];

/// Decides whether a changed path is relevant for a rebuild.
///
/// Patterns are compiled once at construction; a bad pattern is a
/// configuration error and construction fails.
#[derive(Clone)]
pub struct PathFilter {
    extensions: Vec<String>,
    ignore: Vec<Regex>,
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patterns: Vec<&str> = self.ignore.iter().map(Regex::as_str).collect();
        f.debug_struct("PathFilter")
            .field("extensions", &self.extensions)
            .field("ignore", &patterns)
            .finish()
    }
}

impl PathFilter {
    pub fn new<E, P>(extensions: E, ignore_patterns: P) -> Result<Self>
    where
        E: IntoIterator,
        E::Item: Into<String>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let extensions: Vec<String> = extensions.into_iter().map(Into::into).collect();
        let ignore = ignore_patterns
            .into_iter()
            .map(|p| {
                let pattern = p.as_ref();
                Regex::new(pattern).map_err(|source| HotloopError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { extensions, ignore })
    }

    /// Filter with [`DEFAULT_EXTENSIONS`] and [`DEFAULT_IGNORE_PATTERNS`].
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            DEFAULT_EXTENSIONS.iter().copied(),
            DEFAULT_IGNORE_PATTERNS.iter().copied(),
        )
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// True if the file name matches any ignore pattern.
    pub fn should_ignore(&self, path: &Path) -> bool {
        let Some(name) = file_name_str(path) else {
            return false;
        };
        self.ignore.iter().any(|re| re.is_match(&name))
    }

    /// True if the file name ends with one of the watched suffixes.
    pub fn is_watched_extension(&self, path: &Path) -> bool {
        let Some(name) = file_name_str(path) else {
            return false;
        };
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// A change is worth looking at iff it is watched and not ignored.
    pub fn is_eligible(&self, path: &Path) -> bool {
        self.is_watched_extension(path) && !self.should_ignore(path)
    }
}
