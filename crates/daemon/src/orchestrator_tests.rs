// SPDX-License-Identifier: MIT

use super::*;
use cairn_engine::{CapabilityTable, ExecutionOutcome};
use std::time::Duration;
use tempfile::TempDir;

struct EchoGenerator;

#[async_trait::async_trait]
impl CodeGenerator for EchoGenerator {
    async fn generate(&self, task_text: &str) -> Result<String, String> {
        Ok(format!("# generated for: {task_text}"))
    }
}

/// Writes `out.txt` and submits it as the changed file.
struct WritingExecutor;

#[async_trait::async_trait]
impl Executor for WritingExecutor {
    async fn execute(
        &self,
        _source: &str,
        capabilities: &CapabilityTable,
        _agent_id: &str,
        _deadline: Duration,
    ) -> ExecutionOutcome {
        match capabilities.write_file("out.txt", b"hello from agent".to_vec()).await {
            Ok(_) => {}
            Err(e) => return ExecutionOutcome { success: false, error: Some(e.to_string()) },
        }
        match capabilities
            .submit_result("wrote out.txt", vec!["out.txt".to_string()])
            .await
        {
            Ok(_) => ExecutionOutcome { success: true, error: None },
            Err(e) => ExecutionOutcome { success: false, error: Some(e.to_string()) },
        }
    }
}

struct FailingExecutor;

#[async_trait::async_trait]
impl Executor for FailingExecutor {
    async fn execute(
        &self,
        _source: &str,
        _capabilities: &CapabilityTable,
        _agent_id: &str,
        _deadline: Duration,
    ) -> ExecutionOutcome {
        ExecutionOutcome {
            success: false,
            error: Some("boom".to_string()),
        }
    }
}

fn test_config(dir: &TempDir) -> Config {
    Config {
        project_dir: dir.path().join("project"),
        cairn_home: dir.path().join("home"),
        max_concurrent: 4,
        admission_interval: Duration::from_millis(10),
        retention_interval: Duration::from_secs(60),
        retention_age: Duration::from_secs(24 * 60 * 60),
        signal_poll_interval: Duration::from_millis(50),
        signal_stale_after: Duration::from_secs(5 * 60),
        runner_deadline: Duration::from_secs(5),
        executor_deadline: Duration::from_secs(5),
        shutdown_grace: Duration::from_secs(1),
    }
}

async fn new_orchestrator(
    dir: &TempDir,
    executor: Arc<dyn Executor>,
) -> Arc<Orchestrator> {
    let config = test_config(dir);
    tokio::fs::create_dir_all(&config.project_dir).await.unwrap();
    Orchestrator::new(config, Arc::new(EchoGenerator), executor, None)
        .await
        .unwrap()
}

async fn run_to_completion(orch: &Arc<Orchestrator>, agent_id: &AgentId) -> LifecycleRecord {
    for _ in 0..200 {
        let record = orch.get_lifecycle(agent_id).await.unwrap().unwrap();
        if record.state.is_terminal() || record.state == LifecycleState::Completed {
            return record;
        }
        if !orch.admission_tick() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        } else {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
    panic!("agent never reached a terminal/completed state in time");
}

#[tokio::test]
async fn simple_accept_merges_into_stable() {
    let dir = TempDir::new().unwrap();
    let orch = new_orchestrator(&dir, Arc::new(WritingExecutor)).await;

    let agent_id = orch.spawn("write a file".to_string(), Priority::Normal).await.unwrap();
    let record = run_to_completion(&orch, &agent_id).await;
    assert_eq!(record.state, LifecycleState::Completed);

    orch.accept(&agent_id).await.unwrap();
    let stable = orch.overlay().read_file(&NamespaceId::stable(), "out.txt").await.unwrap();
    assert_eq!(stable, b"hello from agent");

    let final_record = orch.get_lifecycle(&agent_id).await.unwrap().unwrap();
    assert_eq!(final_record.state, LifecycleState::Accepted);
}

#[tokio::test]
async fn reject_leaves_stable_untouched() {
    let dir = TempDir::new().unwrap();
    let orch = new_orchestrator(&dir, Arc::new(WritingExecutor)).await;

    let agent_id = orch.spawn("write a file".to_string(), Priority::Normal).await.unwrap();
    let record = run_to_completion(&orch, &agent_id).await;
    assert_eq!(record.state, LifecycleState::Completed);

    orch.reject(&agent_id).await.unwrap();
    let err = orch.overlay().read_file(&NamespaceId::stable(), "out.txt").await.unwrap_err();
    assert!(matches!(err, cairn_overlay::StoreError::FileNotFound(_)));

    let final_record = orch.get_lifecycle(&agent_id).await.unwrap().unwrap();
    assert_eq!(final_record.state, LifecycleState::Rejected);
}

#[tokio::test]
async fn reject_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let orch = new_orchestrator(&dir, Arc::new(FailingExecutor)).await;

    let agent_id = orch.spawn("fail please".to_string(), Priority::Normal).await.unwrap();
    let record = run_to_completion(&orch, &agent_id).await;
    assert_eq!(record.state, LifecycleState::Rejected);

    orch.reject(&agent_id).await.unwrap();
    orch.reject(&agent_id).await.unwrap();
}

#[tokio::test]
async fn accept_on_rejected_agent_is_invalid() {
    let dir = TempDir::new().unwrap();
    let orch = new_orchestrator(&dir, Arc::new(FailingExecutor)).await;

    let agent_id = orch.spawn("fail please".to_string(), Priority::Normal).await.unwrap();
    run_to_completion(&orch, &agent_id).await;
    orch.reject(&agent_id).await.unwrap();

    let err = orch.accept(&agent_id).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Invalid(_)));
}

#[tokio::test]
async fn two_concurrent_agents_stay_isolated() {
    let dir = TempDir::new().unwrap();
    let orch = new_orchestrator(&dir, Arc::new(WritingExecutor)).await;

    let a = orch.spawn("a".to_string(), Priority::Normal).await.unwrap();
    let b = orch.spawn("b".to_string(), Priority::Normal).await.unwrap();
    run_to_completion(&orch, &a).await;
    run_to_completion(&orch, &b).await;

    orch.accept(&a).await.unwrap();
    let content = orch.overlay().read_file(&NamespaceId::stable(), "out.txt").await.unwrap();
    assert_eq!(content, b"hello from agent");

    // b's namespace never touched stable until its own accept.
    orch.reject(&b).await.unwrap();
    let stable = orch.overlay().read_file(&NamespaceId::stable(), "out.txt").await.unwrap();
    assert_eq!(stable, b"hello from agent");
}

#[tokio::test]
async fn accept_on_unknown_agent_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let orch = new_orchestrator(&dir, Arc::new(WritingExecutor)).await;

    let bogus = AgentId::from_string("agent-does-not-exist");
    let err = orch.accept(&bogus).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::NotFound(_)));
}

#[tokio::test]
async fn recover_rejects_orphaned_running_records() {
    let dir = TempDir::new().unwrap();
    let orch = new_orchestrator(&dir, Arc::new(WritingExecutor)).await;

    let agent_id = orch.spawn("never finishes".to_string(), Priority::Normal).await.unwrap();
    let mut record = orch.get_lifecycle(&agent_id).await.unwrap().unwrap();
    record.transition(LifecycleState::Running, 1).unwrap();
    orch.lifecycle.put(&record).await.unwrap();

    let repaired = orch.recover().await.unwrap();
    assert_eq!(repaired, 1);

    let after = orch.get_lifecycle(&agent_id).await.unwrap().unwrap();
    assert_eq!(after.state, LifecycleState::Rejected);

    // Idempotent: nothing left to repair on a second pass.
    assert_eq!(orch.recover().await.unwrap(), 0);
}

#[tokio::test]
async fn retention_tick_purges_old_terminal_records() {
    let dir = TempDir::new().unwrap();
    let orch = new_orchestrator(&dir, Arc::new(FailingExecutor)).await;

    let agent_id = orch.spawn("fail please".to_string(), Priority::Normal).await.unwrap();
    run_to_completion(&orch, &agent_id).await;
    orch.reject(&agent_id).await.unwrap();

    // Force retention eligibility without waiting out retention_age.
    let mut record = orch.get_lifecycle(&agent_id).await.unwrap().unwrap();
    record.updated_at_ms = 0;
    orch.lifecycle.put(&record).await.unwrap();

    let purged = orch.retention_tick().await.unwrap();
    assert_eq!(purged, 1);
    assert!(orch.get_lifecycle(&agent_id).await.unwrap().is_none());
}

#[tokio::test]
async fn admission_respects_priority_ordering() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    tokio::fs::create_dir_all(&config.project_dir).await.unwrap();
    let orch = Orchestrator::new(
        Config { max_concurrent: 1, ..config },
        Arc::new(EchoGenerator),
        Arc::new(WritingExecutor) as Arc<dyn Executor>,
        None,
    )
    .await
    .unwrap();

    let low = orch.spawn("low".to_string(), Priority::Low).await.unwrap();
    let urgent = orch.spawn("urgent".to_string(), Priority::Urgent).await.unwrap();

    assert!(orch.queue.pending_count() >= 1);
    run_to_completion(&orch, &urgent).await;
    run_to_completion(&orch, &low).await;
}
