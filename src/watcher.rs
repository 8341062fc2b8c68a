//! File system watcher for watch mode

use crate::config::Config;
use notify::{Config as NotifyConfig, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

const DEBOUNCE_MS: u64 = 300;

/// Watches a directory for page changes and emits changed page paths
pub struct PageWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<notify::Event>>,
    config: Config,
    /// Set when a single file is watched through its parent directory
    only: Option<PathBuf>,
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn is_create_or_modify(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

impl PageWatcher {
    /// Start watching the given path (file or directory). Only files the
    /// config recognizes as pages are reported.
    pub fn watch(path: &Path, config: Config) -> notify::Result<Self> {
        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            NotifyConfig::default().with_poll_interval(Duration::from_millis(DEBOUNCE_MS)),
        )?;

        let mut only = None;
        if path.is_dir() {
            watcher.watch(path, RecursiveMode::Recursive)?;
        } else if let Some(parent) = path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
            only = Some(canonical(path));
        }

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            config,
            only,
        })
    }

    /// Changed page paths carried by one event
    fn paths_from_event(&self, event: &notify::Event) -> Vec<PathBuf> {
        if !is_create_or_modify(&event.kind) {
            return vec![];
        }
        event
            .paths
            .iter()
            .filter(|p| self.config.is_page(p))
            .filter(|p| self.only.as_ref().is_none_or(|only| canonical(p) == *only))
            .cloned()
            .collect()
    }

    /// Wait for the next batch of changes. Blocks until the first event (or
    /// `timeout`), then drains whatever arrives within the debounce window.
    pub fn next_changes(&self, timeout: Duration) -> Vec<PathBuf> {
        let mut all = HashSet::new();

        match self.receiver.recv_timeout(timeout) {
            Ok(Ok(event)) => all.extend(self.paths_from_event(&event)),
            Ok(Err(_)) | Err(_) => return vec![],
        }

        std::thread::sleep(Duration::from_millis(DEBOUNCE_MS));
        while let Ok(ev) = self.receiver.try_recv() {
            if let Ok(event) = ev {
                all.extend(self.paths_from_event(&event));
            }
        }

        let mut paths: Vec<PathBuf> = all.into_iter().collect();
        paths.sort();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn watcher_for(dir: &Path) -> PageWatcher {
        PageWatcher::watch(dir, Config::default()).unwrap()
    }

    #[test]
    fn test_is_create_or_modify() {
        assert!(is_create_or_modify(&EventKind::Create(CreateKind::File)));
        assert!(is_create_or_modify(&EventKind::Modify(ModifyKind::Data(
            notify::event::DataChange::Content
        ))));
        assert!(!is_create_or_modify(&EventKind::Remove(RemoveKind::File)));
    }

    #[test]
    fn test_paths_from_event_keeps_pages_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let watcher = watcher_for(dir.path());

        let event = notify::Event {
            kind: EventKind::Create(CreateKind::File),
            paths: vec![
                PathBuf::from("site/index.html"),
                PathBuf::from("site/style.css"),
                PathBuf::from("site/about.HTM"),
                PathBuf::from("node_modules/pkg/readme.html"),
            ],
            attrs: Default::default(),
        };

        let paths = watcher.paths_from_event(&event);
        assert_eq!(
            paths,
            vec![PathBuf::from("site/index.html"), PathBuf::from("site/about.HTM")]
        );

        let remove_event = notify::Event {
            kind: EventKind::Remove(RemoveKind::File),
            paths: vec![PathBuf::from("site/index.html")],
            attrs: Default::default(),
        };
        assert!(watcher.paths_from_event(&remove_event).is_empty());
    }

    #[test]
    fn test_watch_single_file_parent() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, "<title>x</title>").unwrap();
        assert!(PageWatcher::watch(&file, Config::default()).is_ok());
    }

    #[test]
    fn test_single_file_ignores_sibling_pages() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("index.html");
        let sibling = dir.path().join("about.html");
        std::fs::write(&file, "<title>x</title>").unwrap();
        std::fs::write(&sibling, "<title>y</title>").unwrap();
        let watcher = PageWatcher::watch(&file, Config::default()).unwrap();

        let event = notify::Event {
            kind: EventKind::Modify(ModifyKind::Any),
            paths: vec![sibling, file.clone()],
            attrs: Default::default(),
        };
        assert_eq!(watcher.paths_from_event(&event), vec![file]);
    }

    #[test]
    fn test_next_changes_times_out_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let watcher = watcher_for(dir.path());
        assert!(watcher.next_changes(Duration::from_millis(50)).is_empty());
    }
}
