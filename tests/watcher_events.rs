// tests/watcher_events.rs

mod common;
use crate::common::{init_tracing, write_file};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::event::{AccessKind, CreateKind, DataChange, EventKind, ModifyKind, RemoveKind, RenameMode};
use tokio::sync::mpsc;
use tokio::time::timeout;

use hotloop::engine::RuntimeEvent;
use hotloop::fs::RealFileSystem;
use hotloop::cli::LogLevel;
use hotloop::logging::{build_filter, level_filter};
use hotloop::types::{ChangeKind, TriggerReason};
use hotloop::watch::event::{change_events_from_notify, change_kind_from_notify};
use hotloop::watch::{spawn_watcher, Debouncer, PathFilter};

#[test]
fn notify_kinds_map_onto_change_kinds() {
    assert_eq!(
        change_kind_from_notify(&EventKind::Create(CreateKind::File)),
        Some(ChangeKind::Created)
    );
    assert_eq!(
        change_kind_from_notify(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
        Some(ChangeKind::Modified)
    );
    assert_eq!(
        change_kind_from_notify(&EventKind::Modify(ModifyKind::Name(RenameMode::To))),
        Some(ChangeKind::Renamed)
    );
    assert_eq!(
        change_kind_from_notify(&EventKind::Remove(RemoveKind::File)),
        Some(ChangeKind::Removed)
    );
    assert_eq!(change_kind_from_notify(&EventKind::Any), Some(ChangeKind::Modified));
    assert_eq!(change_kind_from_notify(&EventKind::Access(AccessKind::Any)), None);
}

#[test]
fn one_notify_event_expands_per_path() {
    let event = notify::Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
        .add_path(PathBuf::from("old.go"))
        .add_path(PathBuf::from("new.go"));

    let changes = change_events_from_notify(event);

    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].path, PathBuf::from("old.go"));
    assert_eq!(changes[1].path, PathBuf::from("new.go"));
    assert!(changes.iter().all(|c| c.kind == ChangeKind::Renamed));

    let access = notify::Event::new(EventKind::Access(AccessKind::Any)).add_path("main.go".into());
    assert!(change_events_from_notify(access).is_empty());
}

#[test]
fn cli_log_level_sets_the_filter() {
    assert_eq!(level_filter(LogLevel::Warn), tracing::level_filters::LevelFilter::WARN);
    assert_eq!(
        build_filter(Some(LogLevel::Debug)).max_level_hint(),
        Some(tracing::level_filters::LevelFilter::DEBUG)
    );
}

#[tokio::test]
async fn watching_a_missing_directory_fails() {
    init_tracing();
    let (tx, _rx) = mpsc::channel(8);
    let debouncer = Debouncer::spawn(
        PathFilter::with_defaults().unwrap(),
        Arc::new(RealFileSystem),
        Duration::from_millis(50),
        tx,
    );

    let missing = std::env::temp_dir().join("hotloop-definitely-missing-dir");
    assert!(spawn_watcher(vec![missing], debouncer).is_err());
}

#[tokio::test]
async fn editing_a_source_file_requests_a_build() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().canonicalize().unwrap();

    let (tx, mut rx) = mpsc::channel(8);
    let debouncer = Debouncer::spawn(
        PathFilter::with_defaults().unwrap(),
        Arc::new(RealFileSystem),
        Duration::from_millis(100),
        tx,
    );
    let watcher = spawn_watcher(vec![root.clone()], debouncer).unwrap();
    assert_eq!(watcher.dirs(), [root.clone()].as_slice());

    write_file(&root, "notes.txt", "ignored");
    write_file(&root, "main.go", "package main");

    let event = timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("no build requested after editing main.go");
    assert_eq!(
        event,
        Some(RuntimeEvent::BuildRequested {
            reason: TriggerReason::FileWatch
        })
    );
}
