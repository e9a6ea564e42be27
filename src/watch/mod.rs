// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Deciding which changed paths matter (`filter`).
//! - Suppressing no-op events by modification time (`modtime`).
//! - Finding the directories to watch (`discover`).
//! - Collapsing bursts of changes into one build trigger (`debounce`).
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//!
//! It does **not** build or run anything; it only turns filesystem changes
//! into `RuntimeEvent::BuildRequested`.

pub mod debounce;
pub mod discover;
pub mod event;
pub mod filter;
pub mod modtime;
pub mod path_utils;
pub mod watcher;

pub use debounce::{DebounceWindow, Debouncer, EventDisposition, DEFAULT_QUIET_PERIOD};
pub use discover::{build_dir_excludes, discover_watch_dirs, DEFAULT_EXCLUDE_DIRS};
pub use event::ChangeEvent;
pub use filter::{PathFilter, DEFAULT_EXTENSIONS, DEFAULT_IGNORE_PATTERNS};
pub use modtime::ModTimeCache;
pub use watcher::{spawn_watcher, WatcherHandle};
