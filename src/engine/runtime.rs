// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::exec::{BuildBackend, ProcessBackend};
use crate::types::TriggerReason;

use super::RuntimeEvent;

/// Counters describing what a runtime did before it exited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub builds: usize,
    pub failed_builds: usize,
    pub restarts: usize,
    /// Build requests folded into a build that was about to start anyway.
    pub coalesced_requests: usize,
}

/// Drives build → restart cycles in response to `RuntimeEvent`s.
///
/// Builds run inline. While one is in progress the channel is still read:
/// build requests are folded into a single follow-up build, and a shutdown
/// takes effect immediately.
pub struct Orchestrator<B: BuildBackend, P: ProcessBackend> {
    builder: B,
    supervisor: P,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    summary: RunSummary,
}

impl<B: BuildBackend, P: ProcessBackend> fmt::Debug for Orchestrator<B, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

impl<B: BuildBackend, P: ProcessBackend> Orchestrator<B, P> {
    pub fn new(builder: B, supervisor: P, event_rx: mpsc::Receiver<RuntimeEvent>) -> Self {
        Self {
            builder,
            supervisor,
            event_rx,
            summary: RunSummary::default(),
        }
    }

    /// Main event loop.
    ///
    /// Runs until a `ShutdownRequested` arrives or every sender is gone, then
    /// makes a best-effort kill of the supervised process. A shutdown that
    /// arrives mid-build abandons the build without restarting anything.
    pub async fn run(mut self) -> RunSummary {
        info!("hotloop runtime started");

        'events: while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "runtime received event");

            let mut reason = match event {
                RuntimeEvent::BuildRequested { reason } => reason,
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested");
                    break;
                }
            };

            loop {
                if self.drain_pending_requests() {
                    info!("shutdown requested");
                    break 'events;
                }
                match self.build_and_restart(reason).await {
                    Cycle::Idle => break,
                    Cycle::FollowUp(next) => reason = next,
                    Cycle::Shutdown => break 'events,
                }
            }
        }

        let outcome = self.supervisor.kill().await;
        info!(?outcome, "runtime exiting");
        self.summary
    }

    /// Fold already-queued build requests into the build about to start.
    ///
    /// Returns true if a shutdown was found in the queue.
    fn drain_pending_requests(&mut self) -> bool {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                RuntimeEvent::BuildRequested { .. } => self.summary.coalesced_requests += 1,
                RuntimeEvent::ShutdownRequested => return true,
            }
        }
        false
    }

    /// One build, then a restart if it succeeded.
    ///
    /// Keeps listening while the build runs: build requests are remembered
    /// as one follow-up, and a shutdown drops the build (its child is killed
    /// on drop) and skips the restart.
    async fn build_and_restart(&mut self, reason: TriggerReason) -> Cycle {
        debug!(%reason, "build requested");
        let mut build = self.builder.run_build();
        let mut follow_up: Option<TriggerReason> = None;
        let mut open = true;

        let result = loop {
            tokio::select! {
                result = &mut build => break result,
                event = self.event_rx.recv(), if open => match event {
                    Some(RuntimeEvent::ShutdownRequested) => {
                        info!("shutdown requested during build; abandoning it");
                        return Cycle::Shutdown;
                    }
                    Some(RuntimeEvent::BuildRequested { reason }) => {
                        if follow_up.is_some() {
                            self.summary.coalesced_requests += 1;
                        } else {
                            follow_up = Some(reason);
                        }
                    }
                    None => open = false,
                },
            }
        };
        self.summary.builds += 1;

        if !result.success {
            self.summary.failed_builds += 1;
            error!(exit_code = ?result.exit_code, "============== Build failed ===================");
            debug!(output = %result.error_output, "captured build output");
        } else {
            // Readiness is broadcast by the supervisor; start failures are logged there.
            let _start = self.supervisor.restart(result.artifact_path).await;
            self.summary.restarts += 1;
        }

        match follow_up {
            Some(next) => Cycle::FollowUp(next),
            None => Cycle::Idle,
        }
    }
}

/// What the loop does after one build cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cycle {
    Idle,
    /// Requests arrived during the build; build again.
    FollowUp(TriggerReason),
    Shutdown,
}
