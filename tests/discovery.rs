// tests/discovery.rs

mod common;
use crate::common::write_file;

use std::path::{Path, PathBuf};

use hotloop::fs::mock::MockFileSystem;
use hotloop::fs::RealFileSystem;
use hotloop::watch::{build_dir_excludes, discover_watch_dirs, PathFilter, DEFAULT_EXCLUDE_DIRS};

fn discover(fs: &MockFileSystem, root: &str) -> Vec<PathBuf> {
    let filter = PathFilter::with_defaults().unwrap();
    let excludes = build_dir_excludes(DEFAULT_EXCLUDE_DIRS).unwrap();
    discover_watch_dirs(fs, Path::new(root), &filter, &excludes).unwrap()
}

#[test]
fn directories_with_sources_are_found() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/main.go", "package main");
    fs.add_file("/proj/pkg/api/routes.go", "package api");
    fs.add_file("/proj/pkg/db/conn.go", "package db");

    let dirs = discover(&fs, "/proj");

    assert_eq!(
        dirs,
        vec![
            PathBuf::from("/proj"),
            PathBuf::from("/proj/pkg/api"),
            PathBuf::from("/proj/pkg/db"),
        ]
    );
}

#[test]
fn directories_without_sources_are_skipped_but_descended() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/README.md", "# readme");
    fs.add_file("/proj/internal/README.md", "docs");
    fs.add_file("/proj/internal/auth/token.go", "package auth");

    let dirs = discover(&fs, "/proj");

    assert_eq!(dirs, vec![PathBuf::from("/proj/internal/auth")]);
}

#[test]
fn hidden_and_excluded_directories_are_pruned() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/main.go", "package main");
    fs.add_file("/proj/.git/hooks/hook.go", "package hooks");
    fs.add_file("/proj/views/layout.go", "package views");
    fs.add_file("/proj/adminviews/page.go", "package adminviews");
    fs.add_file("/proj/testdata/fixture.go", "package testdata");
    fs.add_file("/proj/testdata/nested/deep.go", "package nested");

    let dirs = discover(&fs, "/proj");

    assert_eq!(dirs, vec![PathBuf::from("/proj")]);
}

#[test]
fn empty_tree_yields_nothing() {
    let fs = MockFileSystem::new();
    fs.add_dir("/proj/empty");

    assert!(discover(&fs, "/proj").is_empty());
}

#[test]
fn custom_excludes_replace_the_defaults() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/views/layout.go", "package views");
    fs.add_file("/proj/vendor/lib/lib.go", "package lib");

    let filter = PathFilter::with_defaults().unwrap();
    let excludes = build_dir_excludes(["vendor"]).unwrap();
    let dirs = discover_watch_dirs(&fs, Path::new("/proj"), &filter, &excludes).unwrap();

    assert_eq!(dirs, vec![PathBuf::from("/proj/views")]);
}

#[test]
fn invalid_exclude_glob_is_an_error() {
    assert!(build_dir_excludes(["[unclosed"]).is_err());
}

#[test]
fn discovery_on_a_real_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_file(root, "main.go", "package main");
    write_file(root, "handlers/user.go", "package handlers");
    write_file(root, "handlers/user.go.swp", "");
    write_file(root, "static/app.js", "");
    write_file(root, ".cache/x.go", "package x");

    let filter = PathFilter::with_defaults().unwrap();
    let excludes = build_dir_excludes(DEFAULT_EXCLUDE_DIRS).unwrap();
    let dirs = discover_watch_dirs(&RealFileSystem, root, &filter, &excludes).unwrap();

    assert_eq!(dirs, vec![root.to_path_buf(), root.join("handlers")]);
}
