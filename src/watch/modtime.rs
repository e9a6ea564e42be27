// src/watch/modtime.rs

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::watch::path_utils::normalize_separators;

/// Last observed modification time per path, in Unix seconds.
///
/// Used to drop events where the watch source fired but the file did not
/// actually change. Entries are never removed.
#[derive(Debug, Default)]
pub struct ModTimeCache {
    seen: HashMap<String, i64>,
}

impl ModTimeCache {
    pub fn new() -> Self {
        Self {
            seen: HashMap::new(),
        }
    }

    /// Record `mtime` for `path` and report whether it is a duplicate.
    ///
    /// A duplicate (same mtime as last time) leaves the record untouched.
    pub fn observe(&mut self, path: &Path, mtime: i64) -> bool {
        let key = normalize_separators(path);
        match self.seen.get(&key) {
            Some(&last) if last == mtime => {
                debug!(path = %key, mtime, "modification time unchanged");
                true
            }
            _ => {
                self.seen.insert(key, mtime);
                false
            }
        }
    }

    /// Record `now` for a path whose mtime could not be read.
    ///
    /// Never reports a duplicate.
    pub fn record_unknown(&mut self, path: &Path, now: i64) -> bool {
        self.seen.insert(normalize_separators(path), now);
        false
    }

    pub fn last_seen(&self, path: &Path) -> Option<i64> {
        self.seen.get(&normalize_separators(path)).copied()
    }
}
