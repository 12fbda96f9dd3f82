//! Config file watching for clients that cannot register file watchers.
//!
//! Watches each directory of a workspace folder, except dependency and VCS
//! folders, and reports changes to `.code-check.toml` files over a channel.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::rules::CONFIG_FILE_NAME;

/// Directories never descended into
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// Events from the file watcher
#[derive(Debug)]
pub enum WatcherEvent {
    ConfigFileChanged(PathBuf),
    /// A new directory appeared; it is not watched until `watch_tree` runs
    DirectoryCreated(PathBuf),
    WatcherError(notify::Error),
}

/// Keeps the underlying watcher alive; dropping it stops watching
pub struct ConfigWatcher {
    watcher: RecommendedWatcher,
    root: PathBuf,
}

impl std::fmt::Debug for ConfigWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigWatcher")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl ConfigWatcher {
    /// Start watching `root` for config file changes
    pub fn start(root: &Path) -> Result<(Self, mpsc::UnboundedReceiver<WatcherEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();

        let watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    // Renames can move a directory into the workspace
                    let created = matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(_))
                    );
                    if let EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) =
                        event.kind
                    {
                        for path in event.paths {
                            if is_config_file(&path) {
                                let _ = tx.send(WatcherEvent::ConfigFileChanged(path));
                            } else if created && path.is_dir() && !is_skipped_dir(&path) {
                                let _ = tx.send(WatcherEvent::DirectoryCreated(path));
                            }
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatcherEvent::WatcherError(e));
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )
        .context("Failed to create config file watcher")?;

        let mut config_watcher = Self {
            watcher,
            root: root.to_path_buf(),
        };
        config_watcher.watch_tree(root)?;

        Ok((config_watcher, rx))
    }

    /// Watch `dir` and every directory below it, skipping `node_modules`
    /// and `.git`. Symlinked directories are not followed.
    pub fn watch_tree(&mut self, dir: &Path) -> Result<()> {
        self.watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Cannot list {}: {}", dir.display(), e);
                return Ok(());
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            if is_dir && !is_skipped_dir(&path) {
                if let Err(e) = self.watch_tree(&path) {
                    log::debug!("Not watching {}: {:#}", path.display(), e);
                }
            }
        }

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

pub fn is_config_file(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == CONFIG_FILE_NAME)
}

/// Whether the watcher skips this directory and everything below it
pub fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}
