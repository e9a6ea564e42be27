// src/exec/backend.rs

//! Pluggable build and process backends.
//!
//! The orchestrator talks to a `BuildBackend` and a `ProcessBackend` instead
//! of the concrete [`Builder`] and [`ProcessSupervisor`]. Production code
//! uses those two; tests can provide fakes that script build results and
//! record restarts without spawning anything.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use super::builder::{BuildResult, Builder};
use super::supervisor::{KillOutcome, ProcessSupervisor, StartHandle};

/// Something that can run the build.
pub trait BuildBackend: Send + Sync {
    /// Run one build to completion. Never overlaps with itself.
    fn run_build(&self) -> Pin<Box<dyn Future<Output = BuildResult> + Send + '_>>;
}

/// Something that owns the running program.
pub trait ProcessBackend: Send + Sync {
    /// Kill the current process and schedule `artifact` to start.
    fn restart(&self, artifact: PathBuf) -> Pin<Box<dyn Future<Output = StartHandle> + Send + '_>>;

    /// Best-effort kill of the current process.
    fn kill(&self) -> Pin<Box<dyn Future<Output = KillOutcome> + Send + '_>>;
}

impl BuildBackend for Builder {
    fn run_build(&self) -> Pin<Box<dyn Future<Output = BuildResult> + Send + '_>> {
        Box::pin(self.run())
    }
}

impl ProcessBackend for ProcessSupervisor {
    fn restart(&self, artifact: PathBuf) -> Pin<Box<dyn Future<Output = StartHandle> + Send + '_>> {
        Box::pin(async move { ProcessSupervisor::restart(self, &artifact).await })
    }

    fn kill(&self) -> Pin<Box<dyn Future<Output = KillOutcome> + Send + '_>> {
        Box::pin(ProcessSupervisor::kill(self))
    }
}
