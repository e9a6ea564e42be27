// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::{resolve_config, ConfigFile};
use crate::engine::{Orchestrator, RuntimeEvent};
use crate::errors::Result;
use crate::exec::{artifact_name, BuildCommand, Builder, LaunchConfig, ProcessSupervisor};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::TriggerReason;
use crate::watch::{discover_watch_dirs, spawn_watcher, Debouncer};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - directory discovery and the file watcher
/// - debouncer → orchestrator → builder / supervisor
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let fs = Arc::new(RealFileSystem);
    let root = fs.canonicalize(Path::new(&args.root))?;
    let cfg = resolve_config(fs.as_ref(), &root, &args)?;
    info!(root = ?root, "project root");

    let filter = cfg.path_filter()?;
    let excludes = cfg.dir_excludes()?;
    let dirs = watch_dirs(discover_watch_dirs(fs.as_ref(), &root, &filter, &excludes)?, &root);

    let build_cmd = build_command(&cfg, &root);
    let launch = LaunchConfig {
        work_dir: root.clone(),
        args: cfg.run.args.clone(),
        env: cfg.run.env.clone(),
    };

    if args.dry_run {
        print_dry_run(&cfg, &dirs, &build_cmd, &launch);
        return Ok(());
    }

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let debouncer = Debouncer::spawn(filter, fs.clone(), cfg.quiet_period(), rt_tx.clone());
    let watcher = spawn_watcher(dirs, debouncer)?;

    tokio::spawn(forward_ctrl_c(rt_tx.clone()));

    rt_tx
        .send(RuntimeEvent::BuildRequested {
            reason: TriggerReason::Startup,
        })
        .await
        .map_err(anyhow::Error::from)?;
    drop(rt_tx);

    let orchestrator = Orchestrator::new(
        Builder::new(build_cmd),
        ProcessSupervisor::new(launch),
        rt_rx,
    );
    let summary = orchestrator.run().await;

    drop(watcher);
    info!(
        builds = summary.builds,
        failed = summary.failed_builds,
        restarts = summary.restarts,
        "hotloop stopped"
    );
    Ok(())
}

/// First Ctrl-C → graceful shutdown; a second one exits immediately.
async fn forward_ctrl_c(tx: mpsc::Sender<RuntimeEvent>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        return;
    }
    info!("shutting down; press Ctrl+C again to exit immediately");
    let _ = tx.send(RuntimeEvent::ShutdownRequested).await;

    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("second Ctrl+C; exiting without cleanup");
        std::process::exit(130);
    }
}

/// Resolve the build invocation for `cfg` in `root`.
pub fn build_command(cfg: &ConfigFile, root: &Path) -> BuildCommand {
    let artifact = artifact_name(root, cfg.build.output.as_deref());
    let mut cmd = BuildCommand::tool_build(&cfg.build.tool, root, &artifact, cfg.build.tags.as_deref());
    for (key, value) in &cfg.build.env {
        cmd = cmd.env(key, value);
    }
    cmd
}

/// Fall back to watching the root itself when discovery found nothing.
fn watch_dirs(found: Vec<PathBuf>, root: &Path) -> Vec<PathBuf> {
    if found.is_empty() {
        warn!(root = ?root, "no source directories found; watching project root only");
        return vec![root.to_path_buf()];
    }
    found
}

/// Dry-run output: resolved settings and watched directories.
fn print_dry_run(cfg: &ConfigFile, dirs: &[PathBuf], build: &BuildCommand, launch: &LaunchConfig) {
    println!("hotloop dry-run");
    println!("  watch.extensions = {:?}", cfg.watch.extensions);
    println!("  watch.ignore = {:?}", cfg.watch.ignore);
    println!("  watch.exclude_dirs = {:?}", cfg.watch.exclude_dirs);
    println!("  watch.quiet_period_ms = {}", cfg.watch.quiet_period_ms);
    println!();

    println!("build:");
    println!("  cmd: {}", build.display());
    println!("  dir: {}", build.work_dir.display());
    if !build.env.is_empty() {
        println!("  env: {:?}", build.env);
    }
    println!("run:");
    println!("  artifact: {}", build.artifact.display());
    if !launch.args.is_empty() {
        println!("  args: {:?}", launch.args);
    }
    if !launch.env.is_empty() {
        println!("  env: {:?}", launch.env);
    }
    println!();

    println!("watched directories ({}):", dirs.len());
    for dir in dirs {
        println!("  - {}", dir.display());
    }
}
