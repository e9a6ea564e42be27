// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

/// Render a path as a string with forward slashes only.
///
/// Used as the key for every per-path record so the same file is never
/// tracked under two spellings.
pub fn normalize_separators(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// File name component of `path` as a string, if it has one.
pub fn file_name_str(path: &Path) -> Option<String> {
    let normalized = normalize_separators(path);
    normalized
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
