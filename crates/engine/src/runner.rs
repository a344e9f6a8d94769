// SPDX-License-Identifier: MIT

//! The Agent Runner: drives exactly one agentlet through the nine-step
//! protocol in `§4.7`. Never propagates a panic or error past
//! [`run_agent`] — any unexpected failure ends the run REJECTED with a
//! textual error, matching this workspace's runner convention of never
//! letting one agent's failure take down the supervisor loop.

use crate::collaborators::{CodeGenerator, Executor, LlmCollaborator};
use crate::{CapabilityTable, EngineError, LifecycleStore};
use cairn_core::{AgentId, LifecycleState, NamespaceId};
use cairn_overlay::OverlayStore;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Rejected,
}

/// Runs one agentlet to completion. `now_ms` stamps every lifecycle
/// transition; callers in production pass a wall-clock reading, tests pass
/// a fake clock's reading for determinism.
pub async fn run_agent(
    agent_id: AgentId,
    overlay: Arc<OverlayStore>,
    lifecycle: Arc<LifecycleStore>,
    generator: Arc<dyn CodeGenerator>,
    executor: Arc<dyn Executor>,
    llm: Option<Arc<dyn LlmCollaborator>>,
    executor_deadline: Duration,
    now_ms: impl Fn() -> u64,
) -> RunOutcome {
    match run_agent_inner(
        &agent_id,
        &overlay,
        &lifecycle,
        &*generator,
        &*executor,
        llm,
        executor_deadline,
        &now_ms,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(%agent_id, error = %e, "agent run ended in an unexpected error");
            let _ = reject(&agent_id, &lifecycle, &overlay, &e.to_string(), now_ms()).await;
            RunOutcome::Rejected
        }
    }
}

async fn run_agent_inner(
    agent_id: &AgentId,
    overlay: &Arc<OverlayStore>,
    lifecycle: &Arc<LifecycleStore>,
    generator: &dyn CodeGenerator,
    executor: &dyn Executor,
    llm: Option<Arc<dyn LlmCollaborator>>,
    executor_deadline: Duration,
    now_ms: &impl Fn() -> u64,
) -> Result<RunOutcome, EngineError> {
    // Step 1: QUEUED -> RUNNING.
    let mut record = lifecycle.get(agent_id).await?;
    record.transition(LifecycleState::Running, now_ms())?;
    lifecycle.put(&record).await?;

    // Step 2: open the agent namespace, parented to stable.
    let namespace = NamespaceId::for_agent(agent_id);
    match overlay
        .open_namespace(namespace.clone(), Some(NamespaceId::stable()))
        .await
    {
        Ok(()) | Err(cairn_overlay::StoreError::NamespaceAlreadyExists(_)) => {}
        Err(e) => return Err(e.into()),
    }

    // Step 3: build the capability table.
    let capabilities = CapabilityTable::new(overlay.clone(), namespace.clone(), llm);

    // Step 4: call the generator.
    let source = match generator.generate(&record.task_text).await {
        Ok(source) => source,
        Err(err) => {
            record.error = Some(err.clone());
            record.transition(LifecycleState::Rejected, now_ms())?;
            lifecycle.put(&record).await?;
            return Ok(RunOutcome::Rejected);
        }
    };

    // Step 5: store the generated source in the lifecycle record.
    record.source = Some(source.clone());
    lifecycle.put(&record).await?;

    // Step 6: call the executor with its own deadline.
    let outcome = executor
        .execute(&source, &capabilities, agent_id.as_str(), executor_deadline)
        .await;

    // Step 7/8: inspect execution result and submission.
    let submission = if outcome.success {
        capabilities.read_submission().await?
    } else {
        None
    };

    match (outcome.success, submission) {
        (true, Some(submission)) => {
            record.submission_summary = Some(submission.summary);
            record.changed_files = Some(submission.changed_files);
            record.transition(LifecycleState::Completed, now_ms())?;
            lifecycle.put(&record).await?;
            Ok(RunOutcome::Completed)
        }
        (success, _) => {
            record.error = Some(outcome.error.unwrap_or_else(|| {
                if success {
                    "executor reported success but submitted no result".to_string()
                } else {
                    "executor reported failure".to_string()
                }
            }));
            record.transition(LifecycleState::Rejected, now_ms())?;
            lifecycle.put(&record).await?;
            Ok(RunOutcome::Rejected)
        }
    }
}

async fn reject(
    agent_id: &AgentId,
    lifecycle: &LifecycleStore,
    _overlay: &OverlayStore,
    error: &str,
    now_ms: u64,
) -> Result<(), EngineError> {
    let mut record = lifecycle.get(agent_id).await?;
    if record.state != LifecycleState::Rejected {
        record.error = Some(error.to_string());
        // Best-effort: an invalid transition here just means the run had
        // already reached a terminal state through the normal path.
        let _ = record.transition(LifecycleState::Rejected, now_ms);
        lifecycle.put(&record).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
