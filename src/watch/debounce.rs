// src/watch/debounce.rs

//! Turns a storm of change events into at most one build trigger.
//!
//! The timing logic is split the same way as the rest of the engine:
//! - [`DebounceWindow`] is a pure, clock-injected state machine holding the
//!   single pending deadline.
//! - [`Debouncer`] is the async shell: it filters and deduplicates events,
//!   arms the window, and owns the one long-lived waiter task that fires the
//!   trigger once the deadline passes untouched.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, trace, warn};

use crate::engine::RuntimeEvent;
use crate::fs::{now_secs, FileSystem};
use crate::types::TriggerReason;
use crate::watch::event::ChangeEvent;
use crate::watch::filter::PathFilter;
use crate::watch::modtime::ModTimeCache;

/// Default quiet period.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(1);

/// A single trailing-edge debounce window.
///
/// At most one deadline exists. Arming while armed only moves the deadline.
#[derive(Debug, Clone)]
pub struct DebounceWindow {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl DebounceWindow {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Set the deadline to `now + quiet`.
    ///
    /// Returns `true` if this opened a new window, `false` if it extended the
    /// one already pending.
    pub fn arm(&mut self, now: Instant) -> bool {
        let opened = self.deadline.is_none();
        self.deadline = Some(now + self.quiet);
        opened
    }

    /// Close the window if its deadline has passed.
    ///
    /// Returns `true` exactly once per window: the caller must fire.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// What the debouncer did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Suffix is not in the watched list.
    NotWatched,
    /// File name matched an ignore pattern.
    Ignored,
    /// Modification time unchanged since the last event for this path.
    Duplicate,
    /// The debounce window was armed or pushed out.
    Scheduled,
}

#[derive(Debug)]
struct DebounceState {
    cache: ModTimeCache,
    window: DebounceWindow,
}

/// Filters, deduplicates and debounces change events.
///
/// Dropping the debouncer stops its waiter task; a window that has not fired
/// yet is discarded.
pub struct Debouncer {
    filter: PathFilter,
    fs: Arc<dyn FileSystem>,
    state: Arc<Mutex<DebounceState>>,
    wake: Arc<Notify>,
    waiter: JoinHandle<()>,
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl Debouncer {
    /// Create the debouncer and spawn its waiter task.
    ///
    /// Fired windows are delivered as `RuntimeEvent::BuildRequested` on
    /// `trigger_tx`. Must be called from within a Tokio runtime.
    pub fn spawn(
        filter: PathFilter,
        fs: Arc<dyn FileSystem>,
        quiet: Duration,
        trigger_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        let state = Arc::new(Mutex::new(DebounceState {
            cache: ModTimeCache::new(),
            window: DebounceWindow::new(quiet),
        }));
        let wake = Arc::new(Notify::new());

        let waiter = tokio::spawn(run_waiter(
            Arc::clone(&state),
            Arc::clone(&wake),
            trigger_tx,
        ));

        Self {
            filter,
            fs,
            state,
            wake,
            waiter,
        }
    }

    /// Whether a window is currently pending.
    pub fn is_armed(&self) -> bool {
        lock(&self.state).window.is_armed()
    }

    /// Feed one raw change event through filter, dedupe and debounce.
    ///
    /// Never blocks on a build; only the short state lock is taken.
    pub fn on_event(&self, event: &ChangeEvent) -> EventDisposition {
        let path = event.path.as_path();

        if !self.filter.is_watched_extension(path) {
            trace!(path = ?path, "not a watched extension");
            return EventDisposition::NotWatched;
        }
        if self.filter.should_ignore(path) {
            debug!(path = ?path, "ignored by pattern");
            return EventDisposition::Ignored;
        }

        let stat = self.fs.modified_secs(path);

        let opened = {
            let mut state = lock(&self.state);
            let duplicate = match stat {
                Ok(mtime) => state.cache.observe(path, mtime),
                Err(err) => {
                    warn!(path = ?path, error = %err, "cannot read modification time; treating as changed");
                    state.cache.record_unknown(path, now_secs())
                }
            };

            if duplicate {
                info!(path = ?path, kind = %event.kind, "skip: content not modified");
                return EventDisposition::Duplicate;
            }

            state.window.arm(Instant::now())
        };

        info!(path = ?path, kind = %event.kind, "change detected");
        if opened {
            self.wake.notify_one();
        }
        EventDisposition::Scheduled
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.waiter.abort();
    }
}

fn lock(state: &Mutex<DebounceState>) -> MutexGuard<'_, DebounceState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The single waiter: sleep until the current deadline, re-check on wake,
/// fire only if nobody pushed the deadline out in the meantime.
async fn run_waiter(
    state: Arc<Mutex<DebounceState>>,
    wake: Arc<Notify>,
    trigger_tx: mpsc::Sender<RuntimeEvent>,
) {
    loop {
        let deadline = lock(&state).window.deadline();

        let Some(deadline) = deadline else {
            wake.notified().await;
            continue;
        };

        sleep_until(deadline).await;

        let fire = lock(&state).window.poll(Instant::now());
        if !fire {
            trace!("debounce deadline moved; waiting again");
            continue;
        }

        debug!("quiet period elapsed; requesting build");
        if trigger_tx
            .send(RuntimeEvent::BuildRequested {
                reason: TriggerReason::FileWatch,
            })
            .await
            .is_err()
        {
            debug!("runtime channel closed; debounce waiter exiting");
            return;
        }
    }
}
