//! Document watcher — re-render trigger for watch mode.
//!
//! notify::RecommendedWatcher runs callbacks on an internal thread;
//! DocumentWatcher bridges change notifications to the render loop via
//! mpsc::channel and collapses bursts of events into a single trigger.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};

pub struct DocumentWatcher {
    rx: mpsc::Receiver<()>,
    _watcher: RecommendedWatcher, // Drop stops watching
}

impl DocumentWatcher {
    /// Watch the given document for modifications.
    ///
    /// Linux inotify loses the watch on rename (atomic save), so we watch
    /// the parent directory (NonRecursive) and filter events by path.
    pub fn new(path: &Path) -> Result<Self> {
        let canonical = path.canonicalize()?;
        let target = canonical.clone();
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    let matches = event.paths.iter().any(|p| p == &target);
                    if matches && event.kind.is_modify() {
                        let _ = tx.send(());
                    }
                }
            },
            notify::Config::default(),
        )?;
        let parent = canonical
            .parent()
            .ok_or_else(|| anyhow::anyhow!("cannot watch root path"))?;
        watcher.watch(parent, RecursiveMode::NonRecursive)?;

        Ok(Self { rx, _watcher: watcher })
    }

    /// Block up to `timeout` for a change notification.
    ///
    /// Returns true if the document changed. An editor save often fires
    /// several events back to back; all queued notifications are drained
    /// so one save triggers one re-render.
    pub fn wait_changed(&self, timeout: Duration) -> bool {
        if self.rx.recv_timeout(timeout).is_err() {
            return false;
        }
        while self.rx.try_recv().is_ok() {}
        true
    }
}
