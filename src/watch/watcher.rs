// src/watch/watcher.rs

use std::path::PathBuf;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::watch::debounce::{Debouncer, EventDisposition};
use crate::watch::event::change_events_from_notify;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle stops
/// file watching and the event loop that feeds the debouncer.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    event_loop: JoinHandle<()>,
    dirs: Vec<PathBuf>,
}

impl WatcherHandle {
    /// Directories registered with the OS watcher.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.event_loop.abort();
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("dirs", &self.dirs)
            .finish_non_exhaustive()
    }
}

/// Register a non-recursive watch on each of `dirs` and feed every change
/// into `debouncer` from a dedicated task.
///
/// Failing to create the watcher or to watch any directory is a startup error.
/// Errors reported by the event source afterwards are logged and ignored.
pub fn spawn_watcher(dirs: Vec<PathBuf>, debouncer: Debouncer) -> Result<WatcherHandle> {
    // Channel from the blocking notify callback into the async world.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            // The receiver only disappears during shutdown.
            let _ = event_tx.send(res);
        },
        Config::default(),
    )?;

    info!("initializing watcher");
    for dir in &dirs {
        debug!(dir = ?dir, "watching directory");
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
    }
    info!(count = dirs.len(), "file watcher started");

    let event_loop = tokio::spawn(run_event_loop(event_rx, debouncer));

    Ok(WatcherHandle {
        _inner: watcher,
        event_loop,
        dirs,
    })
}

async fn run_event_loop(
    mut event_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    debouncer: Debouncer,
) {
    while let Some(res) = event_rx.recv().await {
        let event = match res {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "file watch error");
                continue;
            }
        };

        debug!(?event, "received notify event");

        for change in change_events_from_notify(event) {
            let disposition = debouncer.on_event(&change);
            if disposition == EventDisposition::Scheduled {
                debug!(path = ?change.path, "build window armed");
            }
        }
    }
    debug!("watcher event loop finished");
}
