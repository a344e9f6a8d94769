// SPDX-License-Identifier: MIT

//! Placeholder implementations of the two external collaborators the
//! orchestrator calls out to (`§1`: `CodeGenerator` and `Executor` are
//! deliberately out of this repo's scope — a sandboxed interpreter and an
//! LLM-backed generator live elsewhere). `cairnd` wires these in by default
//! so the binary runs standalone; a real deployment replaces them with its
//! own `cairn_engine::collaborators` implementations before calling
//! [`crate::orchestrator::Orchestrator::new`].

use async_trait::async_trait;
use cairn_engine::{CapabilityTable, CodeGenerator, ExecutionOutcome, Executor, LlmCollaborator};
use std::time::Duration;

/// Always fails: no generator is wired in by default. Every spawned agent
/// ends REJECTED with this error until a real generator is configured.
pub struct UnconfiguredGenerator;

#[async_trait]
impl CodeGenerator for UnconfiguredGenerator {
    async fn generate(&self, _task_text: &str) -> Result<String, String> {
        Err("no code generator configured".to_string())
    }
}

/// Never actually reached with the default generator (generation fails
/// first), but stands ready for a deployment that plugs in a generator
/// without also plugging in an executor.
pub struct UnconfiguredExecutor;

#[async_trait]
impl Executor for UnconfiguredExecutor {
    async fn execute(
        &self,
        _source: &str,
        _capabilities: &CapabilityTable,
        _agent_id: &str,
        _deadline: Duration,
    ) -> ExecutionOutcome {
        ExecutionOutcome {
            success: false,
            error: Some("no executor configured".to_string()),
        }
    }
}

pub struct UnconfiguredLlm;

#[async_trait]
impl LlmCollaborator for UnconfiguredLlm {
    async fn ask(&self, _prompt: &str, _context: Option<&str>) -> Result<String, String> {
        Err("no llm collaborator configured".to_string())
    }
}

#[cfg(test)]
#[path = "collaborators_tests.rs"]
mod tests;
