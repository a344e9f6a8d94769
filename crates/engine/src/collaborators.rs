// SPDX-License-Identifier: MIT

//! The two external collaborators the orchestrator core calls out to but
//! does not implement: a sandboxed interpreter for generated agentlet code,
//! and an LLM-backed source generator. Both are out of scope per the
//! project's non-goals; only their calling contract lives here.

use async_trait::async_trait;
use std::time::Duration;

/// Generates agentlet source from a task description.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(&self, task_text: &str) -> Result<String, String>;
}

/// Executes generated source against a capability table. `agent_id` and
/// `deadline` are passed at invocation time per `§4.7`/`§5`: the executor
/// enforces its own per-execution deadline and memory/stack caps using
/// these, the core does not police them itself.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(
        &self,
        source: &str,
        capabilities: &crate::CapabilityTable,
        agent_id: &str,
        deadline: Duration,
    ) -> ExecutionOutcome;
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub error: Option<String>,
}

/// The LLM collaborator backing the `ask_llm` capability.
#[async_trait]
pub trait LlmCollaborator: Send + Sync {
    async fn ask(&self, prompt: &str, context: Option<&str>) -> Result<String, String>;
}
