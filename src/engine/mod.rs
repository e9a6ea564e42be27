// src/engine/mod.rs

//! Orchestration engine for hotloop.
//!
//! The runtime loop in [`runtime`] reacts to:
//! - build requests (startup, closed debounce windows)
//! - shutdown signals
//!
//! File events never reach this loop directly; the watcher task feeds them
//! into the debouncer, which only forwards the resulting build requests.

use crate::types::TriggerReason;

/// Events flowing into the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// Build now, and restart the program if the build succeeds.
    BuildRequested { reason: TriggerReason },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod runtime;

pub use runtime::{Orchestrator, RunSummary};
