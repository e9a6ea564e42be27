// src/types.rs

use std::fmt;

/// What happened to a path, as reported by the filesystem-event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
    Renamed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Modified => "modified",
            ChangeKind::Removed => "removed",
            ChangeKind::Renamed => "renamed",
        };
        f.write_str(s)
    }
}

/// Why a build was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Initial build at startup.
    Startup,
    /// A debounce window closed after qualifying file changes.
    FileWatch,
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerReason::Startup => f.write_str("startup"),
            TriggerReason::FileWatch => f.write_str("file-watch"),
        }
    }
}
