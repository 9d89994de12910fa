use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the watcher to the TUI event loop.
#[derive(Debug)]
pub enum StoreEvent {
    /// The snapshot file was written, replaced or removed by someone.
    SnapshotChanged,
}

/// Watches the data directory for snapshot changes made by other processes.
pub struct SnapshotWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<StoreEvent>,
}

impl SnapshotWatcher {
    /// Start watching `snapshot`'s directory. Call `poll()` each tick.
    pub fn start(snapshot: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let target: PathBuf = snapshot.to_path_buf();
        let dir = snapshot.parent().unwrap_or(Path::new(".")).to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else {
                    return;
                };
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }
                // Atomic saves land via rename, so match on the final name
                let relevant = event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == target.file_name());
                if relevant {
                    let _ = tx.send(StoreEvent::SnapshotChanged);
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(SnapshotWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain queued events without blocking. Several writes in one tick
    /// collapse to a single reload.
    pub fn poll(&self) -> bool {
        let mut changed = false;
        while let Ok(StoreEvent::SnapshotChanged) = self.rx.try_recv() {
            changed = true;
        }
        changed
    }
}
