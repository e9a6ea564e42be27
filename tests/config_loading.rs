// tests/config_loading.rs

mod common;
use crate::common::{cli_args, write_file};

use std::path::{Path, PathBuf};
use std::time::Duration;

use hotloop::build_command;
use hotloop::config::{load_and_validate, resolve_config, ConfigFile, RawConfigFile};
use hotloop::errors::HotloopError;
use hotloop::fs::mock::MockFileSystem;
use hotloop::fs::RealFileSystem;

fn demo_config_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/Hotloop.toml")
}

fn parse(toml_src: &str) -> Result<ConfigFile, HotloopError> {
    let raw: RawConfigFile = toml::from_str(toml_src)?;
    ConfigFile::try_from(raw)
}

#[test]
fn demo_config_loads() {
    let cfg = load_and_validate(demo_config_path()).expect("demo config is valid");

    assert_eq!(cfg.watch.extensions, vec![".go", ".tmpl"]);
    assert_eq!(cfg.quiet_period(), Duration::from_millis(500));
    assert_eq!(cfg.build.tool, "go");
    assert_eq!(cfg.build.tags.as_deref(), Some("dev"));
    assert_eq!(cfg.build.output.as_deref(), Some("server"));
    assert_eq!(cfg.build.env.get("CGO_ENABLED").map(String::as_str), Some("0"));
    assert_eq!(cfg.run.args, vec!["--port", "8080"]);
    assert_eq!(cfg.run.env.get("APP_ENV").map(String::as_str), Some("development"));
}

#[test]
fn empty_file_gives_defaults() {
    let cfg = parse("").unwrap();

    assert_eq!(cfg.watch.extensions, vec![".go"]);
    assert_eq!(cfg.watch.ignore, vec![r"^\.#", r"\.swp$", r"~$", r"\.tmp$"]);
    assert_eq!(cfg.watch.exclude_dirs, vec!["*views", "*data"]);
    assert_eq!(cfg.quiet_period(), Duration::from_secs(1));
    assert_eq!(cfg.build.tool, "go");
    assert!(cfg.build.tags.is_none());
    assert!(cfg.run.args.is_empty());
}

#[test]
fn unknown_keys_are_rejected() {
    let err = parse("[watch]\nextentions = [\".go\"]\n").unwrap_err();
    assert!(matches!(err, HotloopError::TomlError(_)), "got {err:?}");
}

#[test]
fn zero_quiet_period_is_rejected() {
    let err = parse("[watch]\nquiet_period_ms = 0\n").unwrap_err();
    match err {
        HotloopError::ConfigError(msg) => assert!(msg.contains("quiet_period_ms")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn empty_extension_list_is_rejected() {
    let err = parse("[watch]\nextensions = []\n").unwrap_err();
    assert!(matches!(err, HotloopError::ConfigError(_)), "got {err:?}");
}

#[test]
fn bad_ignore_regex_is_rejected() {
    let err = parse("[watch]\nignore = ['(oops']\n").unwrap_err();
    assert!(matches!(err, HotloopError::InvalidPattern { .. }), "got {err:?}");
}

#[test]
fn output_must_be_a_bare_name() {
    let err = parse("[build]\noutput = \"bin/server\"\n").unwrap_err();
    assert!(matches!(err, HotloopError::ConfigError(_)), "got {err:?}");
}

#[test]
fn missing_root_config_falls_back_to_defaults() {
    let fs = MockFileSystem::new();
    fs.add_dir("/proj");

    let cfg = resolve_config(&fs, Path::new("/proj"), &cli_args(Path::new("/proj"))).unwrap();

    assert_eq!(cfg.watch.extensions, vec![".go"]);
}

#[test]
fn root_config_is_picked_up() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/Hotloop.toml", "[build]\ntags = \"integration\"\n");

    let cfg = resolve_config(&fs, Path::new("/proj"), &cli_args(Path::new("/proj"))).unwrap();

    assert_eq!(cfg.build.tags.as_deref(), Some("integration"));
}

#[test]
fn explicit_config_must_exist() {
    let fs = MockFileSystem::new();
    let mut args = cli_args(Path::new("/proj"));
    args.config = Some("/nowhere/Hotloop.toml".to_string());

    assert!(resolve_config(&fs, Path::new("/proj"), &args).is_err());
}

#[test]
fn cli_flags_override_the_file() {
    let tmp = tempfile::tempdir().unwrap();
    write_file(
        tmp.path(),
        "Hotloop.toml",
        "[watch]\nquiet_period_ms = 2000\n\n[build]\ntags = \"dev\"\n\n[run]\nargs = [\"-v\"]\n",
    );

    let mut args = cli_args(tmp.path());
    args.tags = Some("prod".to_string());
    args.quiet_period_ms = Some(250);
    args.extensions = vec![".go".to_string(), ".html".to_string()];
    args.ignore = vec![r"_gen\.go$".to_string()];
    args.args = vec!["--port".to_string(), "9000".to_string()];

    let cfg = resolve_config(&RealFileSystem, tmp.path(), &args).unwrap();

    assert_eq!(cfg.build.tags.as_deref(), Some("prod"));
    assert_eq!(cfg.quiet_period(), Duration::from_millis(250));
    assert_eq!(cfg.watch.extensions, vec![".go", ".html"]);
    // Extra ignores are appended to the defaults.
    assert_eq!(cfg.watch.ignore.len(), 5);
    assert_eq!(cfg.watch.ignore.last().map(String::as_str), Some(r"_gen\.go$"));
    assert_eq!(cfg.run.args, vec!["--port", "9000"]);
}

#[test]
fn invalid_cli_override_is_still_validated() {
    let fs = MockFileSystem::new();
    let mut args = cli_args(Path::new("/proj"));
    args.quiet_period_ms = Some(0);

    assert!(resolve_config(&fs, Path::new("/proj"), &args).is_err());
}

#[test]
fn build_command_follows_config() {
    let cfg = load_and_validate(demo_config_path()).unwrap();
    let cmd = build_command(&cfg, Path::new("/srv/shop"));

    let artifact = format!("server{}", std::env::consts::EXE_SUFFIX);
    assert_eq!(cmd.program, "go");
    assert_eq!(cmd.args, vec!["build", "-o", artifact.as_str(), "-tags", "dev"]);
    assert_eq!(cmd.env.get("GOGC").map(String::as_str), Some("off"));
    assert_eq!(cmd.env.get("CGO_ENABLED").map(String::as_str), Some("0"));
    assert_eq!(cmd.work_dir, PathBuf::from("/srv/shop"));
    assert_eq!(cmd.artifact, PathBuf::from(artifact));
}

#[test]
fn artifact_defaults_to_directory_name() {
    let cfg = parse("").unwrap();
    let cmd = build_command(&cfg, Path::new("/srv/shop"));

    let artifact = format!("shop{}", std::env::consts::EXE_SUFFIX);
    assert_eq!(cmd.args, vec!["build", "-o", artifact.as_str()]);
}
