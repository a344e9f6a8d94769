// SPDX-License-Identifier: MIT

//! Request/response payloads. Only ever exercises the same `Orchestrator`
//! operations available in-process; this layer adds no new behaviour, just
//! an out-of-process calling convention.

use cairn_core::{AgentId, LifecycleRecord, Priority};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op")]
pub enum Request {
    Spawn {
        task_text: String,
        #[serde(default)]
        priority: Priority,
        #[serde(default)]
        source: Option<String>,
    },
    Accept {
        agent_id: AgentId,
    },
    Reject {
        agent_id: AgentId,
    },
    GetLifecycle {
        agent_id: AgentId,
    },
    ListLifecycles,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result")]
pub enum Response {
    Spawned { agent_id: AgentId },
    Accepted { agent_id: AgentId },
    Rejected { agent_id: AgentId },
    Lifecycle { record: Option<LifecycleRecord> },
    Lifecycles { records: Vec<LifecycleRecord> },
    Error { message: String },
}
