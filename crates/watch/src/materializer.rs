// SPDX-License-Identifier: MIT

//! Copies an overlay namespace's effective view onto a scratch directory so
//! external tools (editors, test runners) can observe it. See `§4.5`.

use crate::WatchError;
use cairn_core::AgentId;
use cairn_overlay::OverlayStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Materialises agent effective views under `<cairn_home>/workspaces/<agent-id>`.
pub struct Materializer {
    workspaces_root: PathBuf,
    overlay: Arc<OverlayStore>,
}

impl Materializer {
    pub fn new(workspaces_root: impl Into<PathBuf>, overlay: Arc<OverlayStore>) -> Self {
        Self {
            workspaces_root: workspaces_root.into(),
            overlay,
        }
    }

    pub fn workspace_dir(&self, agent_id: &AgentId) -> PathBuf {
        self.workspaces_root.join(agent_id.as_str())
    }

    /// Recreates the agent's workspace directory and mirrors every path
    /// visible in its effective view onto disk, preserving relative paths.
    /// Returns the directory.
    pub async fn materialize(
        &self,
        agent_id: &AgentId,
        namespace: &cairn_core::NamespaceId,
    ) -> Result<PathBuf, WatchError> {
        let target = self.workspace_dir(agent_id);
        if tokio::fs::try_exists(&target).await? {
            tokio::fs::remove_dir_all(&target).await?;
        }
        tokio::fs::create_dir_all(&target).await?;

        let paths = self.overlay.effective_paths(namespace, "").await?;
        for path in paths {
            let bytes = self.overlay.read_file(namespace, &path).await?;
            let dest = target.join(&path);
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&dest, bytes).await?;
        }
        Ok(target)
    }

    /// Removes a materialised workspace if present. Idempotent.
    pub async fn cleanup(&self, agent_id: &AgentId) -> Result<(), WatchError> {
        let target = self.workspace_dir(agent_id);
        if tokio::fs::try_exists(&target).await? {
            tokio::fs::remove_dir_all(&target).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "materializer_tests.rs"]
mod tests;
