// SPDX-License-Identifier: MIT

//! Recursive `notify`-based watch of the project directory. Non-ignored
//! create/modify events write bytes into the stable namespace; deletes
//! tombstone. Never exits on a per-path failure — failures are logged and
//! the watcher waits for the next event.

use crate::WatchError;
use cairn_core::NamespaceId;
use cairn_overlay::OverlayStore;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn default_ignore() -> Vec<String> {
    [".agentfs", ".git", ".jj", "__pycache__", "node_modules"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone)]
pub struct FileWatcherConfig {
    pub project_dir: PathBuf,
    pub ignore: Vec<String>,
}

impl FileWatcherConfig {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ignore: default_ignore(),
        }
    }
}

pub struct FileWatcher {
    config: FileWatcherConfig,
    overlay: Arc<OverlayStore>,
}

impl FileWatcher {
    pub fn new(config: FileWatcherConfig, overlay: Arc<OverlayStore>) -> Self {
        Self { config, overlay }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        path.components().any(|component| {
            let name = component.as_os_str().to_string_lossy();
            self.config.ignore.iter().any(|ignored| ignored == name.as_ref())
        })
    }

    fn relative_path(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.config.project_dir).ok()?;
        if rel.as_os_str().is_empty() {
            return None;
        }
        Some(rel.to_string_lossy().replace('\\', "/"))
    }

    /// Runs until `cancel` fires or the underlying watch channel closes.
    /// Spawns the blocking `notify` watcher on a dedicated thread and
    /// forwards its events through a bounded tokio channel.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), WatchError> {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<notify::Result<notify::Event>>(256);
        let watch_dir = self.config.project_dir.clone();

        let watch_task = tokio::task::spawn_blocking(move || -> notify::Result<()> {
            let (std_tx, std_rx) = std::sync::mpsc::channel();
            let mut watcher: RecommendedWatcher = notify::recommended_watcher(std_tx)?;
            watcher.watch(&watch_dir, RecursiveMode::Recursive)?;
            for event in std_rx {
                if tx.blocking_send(event).is_err() {
                    break;
                }
            }
            Ok(())
        });

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = rx.recv() => {
                    match event {
                        Some(Ok(event)) => self.handle_event(event).await,
                        Some(Err(e)) => tracing::warn!(error = %e, "file watch error, continuing"),
                        None => break,
                    }
                }
            }
        }

        drop(rx);
        let _ = watch_task.await;
        Ok(())
    }

    async fn handle_event(&self, event: notify::Event) {
        for path in &event.paths {
            if self.is_ignored(path) {
                continue;
            }
            let Some(rel) = self.relative_path(path) else {
                continue;
            };
            match event.kind {
                notify::EventKind::Remove(_) => {
                    if let Err(e) = self.overlay.delete_file(&NamespaceId::stable(), &rel).await {
                        tracing::warn!(path = %rel, error = %e, "failed to tombstone removed file");
                    }
                }
                notify::EventKind::Create(_) | notify::EventKind::Modify(_) => {
                    match tokio::fs::read(path).await {
                        Ok(bytes) => {
                            if let Err(e) = self
                                .overlay
                                .write_file(&NamespaceId::stable(), &rel, bytes)
                                .await
                            {
                                tracing::warn!(path = %rel, error = %e, "failed to mirror file change");
                            }
                        }
                        // Directories, and files removed between the event
                        // firing and this read, are expected and silently
                        // skipped; anything else is logged.
                        Err(e) => {
                            tracing::debug!(path = %rel, error = %e, "skipped unreadable watch path");
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "file_watcher_tests.rs"]
mod tests;
