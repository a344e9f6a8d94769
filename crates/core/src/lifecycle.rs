// SPDX-License-Identifier: MIT

//! The per-agent lifecycle record and its state machine.
//!
//! One [`LifecycleRecord`] exists per live agent id, single-writer owned by
//! the orchestrator. `state` only ever moves along the edges in
//! [`LifecycleState::validate_transition`]; every other caller sees a
//! terminal rejection rather than being able to corrupt the table.

use crate::id::AgentId;
use crate::priority::Priority;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of one agentlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Queued,
    Running,
    Completed,
    Accepted,
    Rejected,
}

crate::simple_display! {
    LifecycleState {
        Queued => "queued",
        Running => "running",
        Completed => "completed",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

impl LifecycleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    /// Validate one edge of the §4.8 state table. `None` represents the
    /// "record does not yet exist" starting point for `spawn`.
    pub fn validate_transition(from: Option<Self>, to: Self) -> Result<(), LifecycleTransitionError> {
        let ok = match (from, to) {
            (None, Self::Queued) => true,
            (Some(Self::Queued), Self::Running) => true,
            (Some(Self::Running), Self::Completed) => true,
            (Some(Self::Running), Self::Rejected) => true,
            (Some(Self::Completed), Self::Accepted) => true,
            (Some(Self::Completed), Self::Rejected) => true,
            // Rejecting a RUNNING agent is explicitly permitted by §4.8.
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(LifecycleTransitionError { from, to })
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid lifecycle transition: {from:?} -> {to:?}")]
pub struct LifecycleTransitionError {
    pub from: Option<LifecycleState>,
    pub to: LifecycleState,
}

/// The single canonical per-agent metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleRecord {
    pub agent_id: AgentId,
    pub state: LifecycleState,
    pub task_text: String,
    pub priority: Priority,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LifecycleRecord {
    /// A freshly spawned record: state QUEUED, timestamps `now`.
    pub fn spawn(agent_id: AgentId, task_text: impl Into<String>, priority: Priority, now_ms: u64) -> Self {
        Self {
            agent_id,
            state: LifecycleState::Queued,
            task_text: task_text.into(),
            priority,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            source: None,
            submission_summary: None,
            changed_files: None,
            error: None,
        }
    }

    /// Move to `to`, validating the edge and stamping `updated_at_ms`.
    /// Leaves the record untouched on an invalid transition.
    pub fn transition(&mut self, to: LifecycleState, now_ms: u64) -> Result<(), LifecycleTransitionError> {
        LifecycleState::validate_transition(Some(self.state), to)?;
        self.state = to;
        self.updated_at_ms = now_ms;
        Ok(())
    }

    pub fn is_retention_eligible(&self, now_ms: u64, retention_ms: u64) -> bool {
        self.state.is_terminal() && now_ms.saturating_sub(self.updated_at_ms) >= retention_ms
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
