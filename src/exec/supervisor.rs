// src/exec/supervisor.rs

//! Ownership of the single supervised child process.
//!
//! Each launched process gets a monitor task (the same shape as a task
//! runner: wait for exit, or kill on a cancel signal). The supervisor keeps
//! the cancel sender and the monitor's join handle in a single slot guarded by
//! an async mutex; a restart holds that mutex from the kill until the new
//! process is recorded, so generations never interleave.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio::sync::{broadcast, oneshot, Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{HotloopError, Result};

/// How the built program is launched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Working directory; relative artifacts are resolved against it.
    pub work_dir: PathBuf,
    pub args: Vec<String>,
    /// Added on top of the inherited environment.
    pub env: BTreeMap<String, String>,
}

impl LaunchConfig {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..Self::default()
        }
    }
}

/// Broadcast after every successful launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStarted {
    pub pid: u32,
    pub generation: u64,
    pub program: PathBuf,
}

/// Result of [`ProcessSupervisor::kill`]. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillOutcome {
    /// Nothing was being supervised.
    NoProcess,
    Killed { pid: u32 },
    /// The process had already exited on its own.
    AlreadyExited { pid: u32, code: Option<i32> },
    /// Killing failed; the slot is cleared regardless.
    Failed { pid: u32, reason: String },
}

/// Completion of a scheduled start. Await it to observe readiness.
pub type StartHandle = JoinHandle<Result<ProcessStarted>>;

#[derive(Debug)]
enum ExitReport {
    Exited(Option<i32>),
    Killed,
    KillFailed(String),
}

/// The current child and the means to stop it.
#[derive(Debug)]
pub struct SupervisedProcess {
    pub pid: u32,
    pub generation: u64,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    cancel: Option<oneshot::Sender<()>>,
    monitor: JoinHandle<ExitReport>,
}

impl SupervisedProcess {
    /// False once the process has exited (or been killed).
    pub fn is_running(&self) -> bool {
        !self.monitor.is_finished()
    }
}

type Slot = Option<SupervisedProcess>;

/// Resolve `artifact` against `work_dir` unless it is already absolute.
///
/// `"app"` in `"."` becomes `"./app"` so it is never looked up on `PATH`.
pub fn resolve_executable(work_dir: &Path, artifact: &Path) -> PathBuf {
    if artifact.is_absolute() {
        return artifact.to_path_buf();
    }
    let rel = artifact.strip_prefix(".").unwrap_or(artifact);
    work_dir.join(rel)
}

#[derive(Debug, Clone)]
struct Launcher {
    config: LaunchConfig,
    generation: Arc<AtomicU64>,
    started_tx: broadcast::Sender<ProcessStarted>,
}

impl Launcher {
    fn launch(&self, slot: &mut Slot, artifact: &Path) -> Result<ProcessStarted> {
        let program = resolve_executable(&self.config.work_dir, artifact);
        info!(program = ?program, "restarting");

        let mut cmd = Command::new(&program);
        cmd.args(&self.config.args)
            .envs(&self.config.env)
            .current_dir(&self.config.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| HotloopError::Spawn {
            program: program.clone(),
            source,
        })?;

        let pid = child.id().unwrap_or_default();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let monitor = tokio::spawn(monitor_process(child, pid, generation, cancel_rx));

        *slot = Some(SupervisedProcess {
            pid,
            generation,
            program: program.clone(),
            args: self.config.args.clone(),
            env: self.config.env.clone(),
            cancel: Some(cancel_tx),
            monitor,
        });

        let started = ProcessStarted {
            pid,
            generation,
            program,
        };
        info!(pid, generation, program = ?started.program, "process is running");

        // Nobody listening is fine.
        let _ = self.started_tx.send(started.clone());
        Ok(started)
    }
}

/// Owns the one "current" child process.
#[derive(Debug)]
pub struct ProcessSupervisor {
    launcher: Launcher,
    current: Arc<Mutex<Slot>>,
}

impl ProcessSupervisor {
    pub fn new(config: LaunchConfig) -> Self {
        let (started_tx, _) = broadcast::channel(16);
        Self {
            launcher: Launcher {
                config,
                generation: Arc::new(AtomicU64::new(0)),
                started_tx,
            },
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Receive a [`ProcessStarted`] after every successful launch.
    pub fn subscribe(&self) -> broadcast::Receiver<ProcessStarted> {
        self.launcher.started_tx.subscribe()
    }

    /// Pid of the current process, if one is recorded and still running.
    pub async fn current_pid(&self) -> Option<u32> {
        let slot = self.current.lock().await;
        slot.as_ref().filter(|p| p.is_running()).map(|p| p.pid)
    }

    /// Generation of the current process, if one is recorded.
    pub async fn current_generation(&self) -> Option<u64> {
        self.current.lock().await.as_ref().map(|p| p.generation)
    }

    /// Stop the current process, if any.
    ///
    /// Never fails: a missing or already-dead process is the goal state, and
    /// kill errors are logged and reported through [`KillOutcome`].
    pub async fn kill(&self) -> KillOutcome {
        let mut slot = self.current.lock().await;
        kill_slot(&mut slot).await
    }

    /// Launch `artifact` as the current process.
    ///
    /// Refuses while a live process is still recorded; use [`restart`] to
    /// replace one.
    ///
    /// [`restart`]: ProcessSupervisor::restart
    pub async fn start(&self, artifact: &Path) -> Result<ProcessStarted> {
        let mut slot = self.current.lock().await;
        if let Some(process) = slot.as_ref() {
            if process.is_running() {
                return Err(HotloopError::ProcessAlreadyRunning(process.pid));
            }
        }
        // Reap the exited monitor before replacing it.
        if let Some(previous) = slot.take() {
            if let Err(join_err) = previous.monitor.await {
                warn!(
                    pid = previous.pid,
                    generation = previous.generation,
                    error = %join_err,
                    "monitor task of exited process failed"
                );
            }
        }
        self.launcher.launch(&mut slot, artifact)
    }

    /// Kill the current process, then launch `artifact` in the background.
    ///
    /// Returns once the old process is gone; the launch itself runs on a
    /// spawned task that keeps the slot locked until the new process is
    /// recorded. Await the returned handle to observe readiness.
    pub async fn restart(&self, artifact: &Path) -> StartHandle {
        let mut slot: OwnedMutexGuard<Slot> = Arc::clone(&self.current).lock_owned().await;

        info!("kill running process");
        let outcome = kill_slot(&mut slot).await;
        debug!(?outcome, "previous process stopped");

        let launcher = self.launcher.clone();
        let artifact = artifact.to_path_buf();
        tokio::spawn(async move {
            let result = launcher.launch(&mut slot, &artifact);
            if let Err(err) = &result {
                warn!(error = %err, "failed to start process");
            }
            result
        })
    }
}

async fn kill_slot(slot: &mut Slot) -> KillOutcome {
    let Some(mut process) = slot.take() else {
        debug!("no supervised process to kill");
        return KillOutcome::NoProcess;
    };

    let pid = process.pid;
    if let Some(cancel) = process.cancel.take() {
        if cancel.send(()).is_err() {
            debug!(pid, "process already exited before kill");
        }
    }

    let outcome = match process.monitor.await {
        Ok(ExitReport::Killed) => KillOutcome::Killed { pid },
        Ok(ExitReport::Exited(code)) => KillOutcome::AlreadyExited { pid, code },
        Ok(ExitReport::KillFailed(reason)) => KillOutcome::Failed { pid, reason },
        Err(join_err) => KillOutcome::Failed {
            pid,
            reason: join_err.to_string(),
        },
    };

    match &outcome {
        KillOutcome::Failed { pid, reason } => {
            warn!(pid, generation = process.generation, %reason, "kill failed");
        }
        other => debug!(outcome = ?other, generation = process.generation, "kill finished"),
    }
    outcome
}

/// Wait for the child to exit, or kill it when `cancel_rx` fires.
async fn monitor_process(
    mut child: Child,
    pid: u32,
    generation: u64,
    mut cancel_rx: oneshot::Receiver<()>,
) -> ExitReport {
    tokio::select! {
        status = child.wait() => {
            match status {
                Ok(status) => {
                    info!(pid, generation, exit_code = ?status.code(), "process exited");
                    ExitReport::Exited(status.code())
                }
                Err(err) => {
                    warn!(pid, generation, error = %err, "waiting for process failed");
                    ExitReport::Exited(None)
                }
            }
        }

        cancel = &mut cancel_rx => {
            if cancel.is_err() {
                debug!(pid, generation, "supervisor dropped; killing process");
            }
            match child.kill().await {
                Ok(()) => {
                    debug!(pid, generation, "process killed");
                    ExitReport::Killed
                }
                Err(err) => {
                    warn!(pid, generation, error = %err, "failed to kill process");
                    ExitReport::KillFailed(err.to_string())
                }
            }
        }
    }
}
