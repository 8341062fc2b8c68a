//! Integration tests for the watcher public API.

use seolens::config::Config;
use seolens::watcher::PageWatcher;
use std::fs;
use std::time::Duration;

#[test]
fn watcher_watch_temp_dir_succeeds() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = PageWatcher::watch(dir.path(), Config::default());
    assert!(
        result.is_ok(),
        "watch on temp dir should succeed: {:?}",
        result.err()
    );
}

#[test]
fn watcher_reports_written_page() {
    let dir = tempfile::TempDir::new().unwrap();
    let watcher = PageWatcher::watch(dir.path(), Config::default()).unwrap();

    let page = dir.path().join("index.html");
    fs::write(&page, "<title>Watched page</title>").unwrap();
    fs::write(dir.path().join("style.css"), "p {}").unwrap();

    let changes = watcher.next_changes(Duration::from_secs(10));
    assert!(
        changes.iter().all(|p| p.extension().is_some_and(|e| e == "html")),
        "only pages are reported: {:?}",
        changes
    );
    assert!(
        changes.iter().any(|p| p.ends_with("index.html")),
        "written page should be reported: {:?}",
        changes
    );
}

#[test]
fn watcher_respects_custom_page_patterns() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = Config {
        page_patterns: vec![".xhtml".to_string()],
        ..Config::default()
    };
    let watcher = PageWatcher::watch(dir.path(), config).unwrap();

    fs::write(dir.path().join("page.xhtml"), "<title>x</title>").unwrap();

    let changes = watcher.next_changes(Duration::from_secs(10));
    assert!(changes.iter().any(|p| p.ends_with("page.xhtml")), "{:?}", changes);
}
