// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything that spawns an OS process lives here, using
//! `tokio::process::Command`:
//!
//! - [`builder`] runs the build command under an exclusive lock.
//! - [`supervisor`] owns the single running program and its restarts.
//! - [`output`] streams child output to the terminal while capturing it.
//! - [`backend`] provides the `BuildBackend` / `ProcessBackend` traits the
//!   orchestrator is written against, so tests can swap in fakes.

pub mod backend;
pub mod builder;
pub mod output;
pub mod supervisor;

pub use backend::{BuildBackend, ProcessBackend};
pub use builder::{artifact_name, BuildCommand, BuildResult, Builder};
pub use supervisor::{
    resolve_executable, KillOutcome, LaunchConfig, ProcessStarted, ProcessSupervisor,
    StartHandle,
};
