// src/watch/event.rs

//! Change events as seen by the debouncer.

use std::path::PathBuf;

use notify::event::{EventKind, ModifyKind};

use crate::types::ChangeKind;

/// A single path-level change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Map a `notify` event kind onto a [`ChangeKind`].
///
/// Pure access notifications carry no content change and map to `None`.
pub fn change_kind_from_notify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Access(_) => None,
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Renamed),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Any | EventKind::Other => Some(ChangeKind::Modified),
    }
}

/// Expand one `notify` event into per-path [`ChangeEvent`]s.
pub fn change_events_from_notify(event: notify::Event) -> Vec<ChangeEvent> {
    match change_kind_from_notify(&event.kind) {
        Some(kind) => event
            .paths
            .into_iter()
            .map(|path| ChangeEvent { path, kind })
            .collect(),
        None => Vec::new(),
    }
}
