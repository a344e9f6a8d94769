// SPDX-License-Identifier: MIT

//! Thin wrapper over the `"lifecycle"` namespace's KV space. One
//! full-record-replace entry per agent, keyed `agent:<id>`.

use crate::EngineError;
use cairn_core::{AgentId, LifecycleRecord};
use cairn_overlay::{OverlayStore, StoreError};
use std::sync::Arc;

const LIFECYCLE_NAMESPACE: &str = "lifecycle";
const KEY_PREFIX: &str = "agent:";

pub struct LifecycleStore {
    overlay: Arc<OverlayStore>,
    namespace: cairn_core::NamespaceId,
}

impl LifecycleStore {
    /// Opens the lifecycle namespace, creating it if this is the first run.
    pub async fn open(overlay: Arc<OverlayStore>) -> Result<Self, EngineError> {
        let namespace = cairn_core::NamespaceId::from(LIFECYCLE_NAMESPACE);
        match overlay.open_namespace(namespace.clone(), None).await {
            Ok(()) => {}
            Err(StoreError::NamespaceAlreadyExists(_)) => {}
            Err(e) => return Err(e.into()),
        }
        Ok(Self { overlay, namespace })
    }

    fn key(agent_id: &AgentId) -> String {
        format!("{KEY_PREFIX}{agent_id}")
    }

    /// Replaces the full record for an agent.
    pub async fn put(&self, record: &LifecycleRecord) -> Result<(), EngineError> {
        let bytes = serde_json::to_vec(record)?;
        self.overlay
            .set_kv(&self.namespace, &Self::key(&record.agent_id), bytes)
            .await?;
        Ok(())
    }

    pub async fn get(&self, agent_id: &AgentId) -> Result<LifecycleRecord, EngineError> {
        let bytes = self.overlay.get_kv(&self.namespace, &Self::key(agent_id)).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn remove(&self, agent_id: &AgentId) -> Result<(), EngineError> {
        self.overlay.delete_kv(&self.namespace, &Self::key(agent_id)).await?;
        Ok(())
    }

    /// All lifecycle records, in no particular order.
    pub async fn list(&self) -> Result<Vec<LifecycleRecord>, EngineError> {
        let keys = self.overlay.list_kv(&self.namespace).await?;
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            if !key.starts_with(KEY_PREFIX) {
                continue;
            }
            let bytes = self.overlay.get_kv(&self.namespace, &key).await?;
            records.push(serde_json::from_slice(&bytes)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
#[path = "lifecycle_store_tests.rs"]
mod tests;
