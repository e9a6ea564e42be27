// tests/debounce.rs

mod common;
use crate::common::init_tracing;

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};

use hotloop::engine::RuntimeEvent;
use hotloop::fs::mock::MockFileSystem;
use hotloop::types::{ChangeKind, TriggerReason};
use hotloop::watch::{ChangeEvent, DebounceWindow, Debouncer, EventDisposition, PathFilter};

const QUIET: Duration = Duration::from_secs(1);

fn setup() -> (MockFileSystem, Debouncer, mpsc::Receiver<RuntimeEvent>) {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file_with_mtime("src/main.go", "package main", 1);
    fs.add_file_with_mtime("src/util.go", "package main", 1);

    let (tx, rx) = mpsc::channel(8);
    let debouncer = Debouncer::spawn(
        PathFilter::with_defaults().unwrap(),
        Arc::new(fs.clone()),
        QUIET,
        tx,
    );
    (fs, debouncer, rx)
}

fn modified(path: &str) -> ChangeEvent {
    ChangeEvent::new(path, ChangeKind::Modified)
}

fn file_watch_build() -> RuntimeEvent {
    RuntimeEvent::BuildRequested {
        reason: TriggerReason::FileWatch,
    }
}

#[tokio::test(start_paused = true)]
async fn burst_of_changes_fires_once_after_last_event() {
    let (fs, debouncer, mut rx) = setup();
    let start = Instant::now();

    assert_eq!(debouncer.on_event(&modified("src/main.go")), EventDisposition::Scheduled);

    tokio::time::sleep(Duration::from_millis(300)).await;
    fs.set_modified("src/util.go", 2);
    assert_eq!(debouncer.on_event(&modified("src/util.go")), EventDisposition::Scheduled);

    tokio::time::sleep(Duration::from_millis(300)).await;
    fs.set_modified("src/main.go", 3);
    assert_eq!(debouncer.on_event(&modified("src/main.go")), EventDisposition::Scheduled);

    let event = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("debounce window never fired");
    assert_eq!(event, Some(file_watch_build()));

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1600), "fired too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1700), "fired too late: {elapsed:?}");

    // Only one trigger for the whole burst.
    assert!(timeout(Duration::from_secs(3), rx.recv()).await.is_err());
    assert!(!debouncer.is_armed());
}

#[tokio::test(start_paused = true)]
async fn nothing_fires_before_the_quiet_period() {
    let (_fs, debouncer, mut rx) = setup();

    debouncer.on_event(&modified("src/main.go"));
    assert!(debouncer.is_armed());

    assert!(timeout(Duration::from_millis(900), rx.recv()).await.is_err());
    assert!(debouncer.is_armed());

    let event = timeout(Duration::from_millis(200), rx.recv()).await.unwrap();
    assert_eq!(event, Some(file_watch_build()));
}

#[tokio::test(start_paused = true)]
async fn unchanged_mtime_is_skipped() {
    let (_fs, debouncer, mut rx) = setup();

    assert_eq!(debouncer.on_event(&modified("src/main.go")), EventDisposition::Scheduled);
    assert_eq!(debouncer.on_event(&modified("src/main.go")), EventDisposition::Duplicate);

    assert_eq!(rx.recv().await, Some(file_watch_build()));

    // Still the same mtime after the build: no new window.
    assert_eq!(debouncer.on_event(&modified("src/main.go")), EventDisposition::Duplicate);
    assert!(!debouncer.is_armed());
    assert!(timeout(Duration::from_secs(3), rx.recv()).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn ignored_and_unwatched_paths_never_arm() {
    let (_fs, debouncer, mut rx) = setup();

    assert_eq!(debouncer.on_event(&modified("README.md")), EventDisposition::NotWatched);
    assert_eq!(debouncer.on_event(&modified("src/.#main.go")), EventDisposition::Ignored);
    assert_eq!(debouncer.on_event(&modified("src/main.go~")), EventDisposition::NotWatched);
    assert_eq!(debouncer.on_event(&modified("src/main.go.swp")), EventDisposition::NotWatched);

    assert!(!debouncer.is_armed());
    assert!(timeout(Duration::from_secs(3), rx.recv()).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn change_after_fire_opens_a_new_window() {
    let (fs, debouncer, mut rx) = setup();

    debouncer.on_event(&modified("src/main.go"));
    assert_eq!(rx.recv().await, Some(file_watch_build()));

    fs.set_modified("src/main.go", 10);
    assert_eq!(debouncer.on_event(&modified("src/main.go")), EventDisposition::Scheduled);
    let event = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(event, Some(file_watch_build()));
}

#[tokio::test(start_paused = true)]
async fn removed_file_still_schedules_a_build() {
    let (fs, debouncer, mut rx) = setup();

    fs.remove("src/util.go");
    let removed = ChangeEvent::new("src/util.go", ChangeKind::Removed);
    assert_eq!(debouncer.on_event(&removed), EventDisposition::Scheduled);

    let event = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(event, Some(file_watch_build()));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_debouncer_discards_a_pending_window() {
    let (_fs, debouncer, mut rx) = setup();

    debouncer.on_event(&modified("src/main.go"));
    drop(debouncer);

    // The waiter held the only sender; aborting it closes the channel.
    let event = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(event, None);
}

#[test]
fn window_arm_reports_whether_it_opened() {
    let mut window = DebounceWindow::new(QUIET);
    let t0 = Instant::now();

    assert!(!window.is_armed());
    assert!(window.arm(t0));
    assert!(!window.arm(t0 + Duration::from_millis(200)));
    assert_eq!(window.deadline(), Some(t0 + Duration::from_millis(1200)));
}

#[test]
fn window_poll_fires_once() {
    let mut window = DebounceWindow::new(QUIET);
    let t0 = Instant::now();

    assert!(!window.poll(t0));
    window.arm(t0);
    assert!(!window.poll(t0 + Duration::from_millis(999)));
    assert!(window.poll(t0 + QUIET));
    assert!(!window.poll(t0 + QUIET * 2));
    assert!(!window.is_armed());
}

proptest! {
    #[test]
    fn window_fires_exactly_one_quiet_period_after_the_last_arm(
        gaps in proptest::collection::vec(0u64..1000, 1..30)
    ) {
        let mut window = DebounceWindow::new(QUIET);
        let t0 = Instant::now();
        let mut now = t0;

        for gap in gaps {
            now += Duration::from_millis(gap);
            // Every gap is shorter than the quiet period, so nothing fires in between.
            prop_assert!(!window.poll(now));
            window.arm(now);
        }

        prop_assert!(!window.poll(now + QUIET - Duration::from_millis(1)));
        prop_assert!(window.poll(now + QUIET));
        prop_assert!(!window.poll(now + QUIET));
    }
}
