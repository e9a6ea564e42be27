#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use hotloop::cli::CliArgs;

pub use hotloop_test_utils::{init_tracing, with_timeout};

/// CLI arguments as if `hotloop --root <root>` was run with nothing else.
pub fn cli_args(root: &Path) -> CliArgs {
    CliArgs {
        root: root.to_string_lossy().into_owned(),
        config: None,
        tags: None,
        build_tool: None,
        quiet_period_ms: None,
        extensions: Vec::new(),
        ignore: Vec::new(),
        log_level: None,
        dry_run: false,
        args: Vec::new(),
    }
}

/// Write `contents` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}
