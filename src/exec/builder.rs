// src/exec/builder.rs

//! Exclusive build runner.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::errors::{HotloopError, Result};
use crate::exec::output::{tee_lines, Stream};

/// Environment overrides applied to every tool build.
pub const BUILD_ENV_OVERRIDES: &[(&str, &str)] = &[("GOGC", "off")];

/// Name of the built binary: the configured name, or the project directory's
/// name, plus the platform executable suffix.
pub fn artifact_name(project_dir: &Path, output: Option<&str>) -> String {
    let base = match output {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => project_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string()),
    };

    let suffix = std::env::consts::EXE_SUFFIX;
    if suffix.is_empty() || base.ends_with(suffix) {
        base
    } else {
        format!("{base}{suffix}")
    }
}

/// A fully resolved build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Added on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    pub work_dir: PathBuf,
    /// Path of the produced binary, relative to `work_dir` unless absolute.
    pub artifact: PathBuf,
}

impl BuildCommand {
    pub fn new(
        program: impl Into<String>,
        work_dir: impl Into<PathBuf>,
        artifact: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            work_dir: work_dir.into(),
            artifact: artifact.into(),
        }
    }

    /// `<tool> build -o <artifact> [-tags <tags>]` with [`BUILD_ENV_OVERRIDES`].
    pub fn tool_build(
        tool: &str,
        work_dir: impl Into<PathBuf>,
        artifact: &str,
        tags: Option<&str>,
    ) -> Self {
        let mut cmd = Self::new(tool, work_dir, artifact)
            .arg("build")
            .arg("-o")
            .arg(artifact);
        if let Some(tags) = tags.filter(|t| !t.is_empty()) {
            cmd = cmd.arg("-tags").arg(tags);
        }
        for (key, value) in BUILD_ENV_OVERRIDES {
            cmd = cmd.env(*key, *value);
        }
        cmd
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Shell-ish rendering for log lines.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of one build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub success: bool,
    pub artifact_path: PathBuf,
    /// Captured stdout + stderr of the build tool (or the spawn error).
    pub error_output: String,
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

/// Runs the build command, one invocation at a time.
#[derive(Debug)]
pub struct Builder {
    command: BuildCommand,
    lock: Mutex<()>,
    builds: AtomicU64,
}

impl Builder {
    pub fn new(command: BuildCommand) -> Self {
        Self {
            command,
            lock: Mutex::new(()),
            builds: AtomicU64::new(0),
        }
    }

    pub fn command(&self) -> &BuildCommand {
        &self.command
    }

    /// Number of builds started so far.
    pub fn build_count(&self) -> u64 {
        self.builds.load(Ordering::SeqCst)
    }

    /// Run the build.
    ///
    /// Holds the build lock for the whole invocation; concurrent callers wait
    /// their turn. Output is streamed to the terminal while it is captured.
    pub async fn run(&self) -> BuildResult {
        let _guard = self.lock.lock().await;
        let build = self.builds.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();

        info!(build, cmd = %self.command.display(), "start building");

        let (success, exit_code, output) = match self.execute().await {
            Ok((status, output)) => (status.success(), status.code(), output),
            Err(err) => (false, None, err.to_string()),
        };
        let duration = started.elapsed();

        if success {
            info!(build, ?duration, artifact = ?self.command.artifact, "build was successful");
        } else {
            error!(build, ?duration, ?exit_code, "build failed");
        }

        BuildResult {
            success,
            artifact_path: self.command.artifact.clone(),
            error_output: if success { String::new() } else { output },
            exit_code,
            duration,
        }
    }

    async fn execute(&self) -> Result<(ExitStatus, String)> {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .envs(&self.command.env)
            .current_dir(&self.command.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| HotloopError::Spawn {
            program: PathBuf::from(&self.command.program),
            source,
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (status, out, err) = tokio::join!(
            child.wait(),
            tee_lines(stdout, Stream::Stdout),
            tee_lines(stderr, Stream::Stderr),
        );

        Ok((status?, format!("{out}{err}")))
    }
}
