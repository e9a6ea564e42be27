//! In-memory stand-ins for the build and process backends.

use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hotloop::exec::{BuildBackend, BuildResult, KillOutcome, ProcessBackend, ProcessStarted, StartHandle};

/// A successful build producing `artifact`.
pub fn build_ok(artifact: &str) -> BuildResult {
    BuildResult {
        success: true,
        artifact_path: PathBuf::from(artifact),
        error_output: String::new(),
        exit_code: Some(0),
        duration: Duration::from_millis(1),
    }
}

/// A failed build with the given compiler output.
pub fn build_failed(output: &str) -> BuildResult {
    BuildResult {
        success: false,
        artifact_path: PathBuf::from("app"),
        error_output: output.to_string(),
        exit_code: Some(2),
        duration: Duration::from_millis(1),
    }
}

/// A fake builder that:
/// - counts how often it was asked to build
/// - replays scripted results in order, then succeeds with `app`
/// - optionally sleeps per build, so tests can queue requests meanwhile.
#[derive(Debug, Clone, Default)]
pub struct FakeBuilder {
    script: Arc<Mutex<VecDeque<BuildResult>>>,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl FakeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(results: impl IntoIterator<Item = BuildResult>) -> Self {
        Self {
            script: Arc::new(Mutex::new(results.into_iter().collect())),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BuildBackend for FakeBuilder {
    fn run_build(&self) -> Pin<Box<dyn Future<Output = BuildResult> + Send + '_>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| build_ok("app"))
        })
    }
}

/// What the orchestrator asked a [`FakeSupervisor`] to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorCall {
    Restart(PathBuf),
    Kill,
}

/// A fake supervisor that records every call and "starts" processes with
/// made-up pids.
#[derive(Debug, Clone, Default)]
pub struct FakeSupervisor {
    calls: Arc<Mutex<Vec<SupervisorCall>>>,
    generation: Arc<AtomicUsize>,
}

impl FakeSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SupervisorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn restarts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SupervisorCall::Restart(_)))
            .count()
    }
}

impl ProcessBackend for FakeSupervisor {
    fn restart(&self, artifact: PathBuf) -> Pin<Box<dyn Future<Output = StartHandle> + Send + '_>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push(SupervisorCall::Restart(artifact.clone()));
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) as u64 + 1;

            tokio::spawn(async move {
                Ok(ProcessStarted {
                    pid: 40_000 + generation as u32,
                    generation,
                    program: artifact,
                })
            })
        })
    }

    fn kill(&self) -> Pin<Box<dyn Future<Output = KillOutcome> + Send + '_>> {
        Box::pin(async move {
            let mut calls = self.calls.lock().unwrap();
            let previous = calls.iter().filter(|c| matches!(c, SupervisorCall::Restart(_))).count();
            calls.push(SupervisorCall::Kill);
            if previous == 0 {
                KillOutcome::NoProcess
            } else {
                KillOutcome::Killed {
                    pid: 40_000 + previous as u32,
                }
            }
        })
    }
}
