// src/watch/discover.rs

//! Directory discovery: which directories need a (non-recursive) watch.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, trace, warn};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::watch::filter::PathFilter;
use crate::watch::path_utils::file_name_str;

/// Default directory-name globs that are never descended into.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &["*views", "*data"];

/// Compile directory-name globs (matched against the last path component).
pub fn build_dir_excludes<I, S>(patterns: I) -> Result<GlobSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat.as_ref())?);
    }
    Ok(builder.build()?)
}

/// Walk `root` and return every directory that directly contains at least one
/// file with a watched extension.
///
/// Hidden directories (leading `.`) and directories whose name matches
/// `exclude_dirs` are skipped along with everything beneath them. The result
/// is sorted, so parents come before their children.
pub fn discover_watch_dirs(
    fs: &dyn FileSystem,
    root: &Path,
    filter: &PathFilter,
    exclude_dirs: &GlobSet,
) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(fs, root, filter, exclude_dirs, &mut found)?;
    found.sort();
    debug!(root = ?root, count = found.len(), "directory discovery finished");
    Ok(found)
}

fn walk(
    fs: &dyn FileSystem,
    dir: &Path,
    filter: &PathFilter,
    exclude_dirs: &GlobSet,
    found: &mut Vec<PathBuf>,
) -> Result<()> {
    let mut entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = ?dir, error = %err, "cannot read directory; skipping");
            return Ok(());
        }
    };
    entries.sort();

    let mut has_source = false;
    for entry in entries {
        let name = file_name_str(&entry).unwrap_or_default();
        trace!(path = ?entry, "discovery visiting");

        if fs.is_dir(&entry) {
            if name.starts_with('.') || exclude_dirs.is_match(&name) {
                debug!(dir = ?entry, "skipping excluded directory");
                continue;
            }
            walk(fs, &entry, filter, exclude_dirs, found)?;
            continue;
        }

        if !has_source && filter.is_watched_extension(&entry) {
            has_source = true;
        }
    }

    if has_source {
        found.push(dir.to_path_buf());
    }

    Ok(())
}
