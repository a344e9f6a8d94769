// SPDX-License-Identifier: MIT

//! The top-level supervisor (`§4.8`): initialisation, recovery, admission,
//! accept/reject reconciliation, and retention. Owns the lifecycle store and
//! task queue exclusively; every lifecycle mutation goes through one of
//! this type's methods so writes are never lost to a racing updater.

use crate::config::Config;
use crate::error::OrchestratorError;
use cairn_core::{AgentId, LifecycleRecord, LifecycleState, NamespaceId, Priority};
use cairn_engine::{CodeGenerator, EngineError, Executor, LifecycleStore, LlmCollaborator, TaskQueue};
use cairn_overlay::{OverlayStore, StoreError};
use cairn_watch::{FileWatcher, FileWatcherConfig, Materializer, Signal, SignalWatcher, SignalWatcherConfig};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

fn is_not_found(e: &EngineError) -> bool {
    matches!(e, EngineError::Store(StoreError::FileNotFound(_)))
}

pub struct Orchestrator {
    config: Config,
    overlay: Arc<OverlayStore>,
    lifecycle: Arc<LifecycleStore>,
    queue: Arc<TaskQueue>,
    materializer: Arc<Materializer>,
    generator: Arc<dyn CodeGenerator>,
    executor: Arc<dyn Executor>,
    llm: Option<Arc<dyn LlmCollaborator>>,
    /// Serialises accept-merges against the file watcher's writes into
    /// stable, per `§5`'s "stable write" logical lock.
    stable_write_lock: Arc<AsyncMutex<()>>,
}

impl Orchestrator {
    pub async fn new(
        config: Config,
        generator: Arc<dyn CodeGenerator>,
        executor: Arc<dyn Executor>,
        llm: Option<Arc<dyn LlmCollaborator>>,
    ) -> Result<Arc<Self>, OrchestratorError> {
        tokio::fs::create_dir_all(config.workspaces_root()).await?;
        tokio::fs::create_dir_all(config.signals_dir()).await?;
        tokio::fs::create_dir_all(config.previews_dir()).await?;

        let overlay = Arc::new(OverlayStore::new(config.overlay_root()).await?);
        match overlay.open_namespace(NamespaceId::stable(), None).await {
            Ok(()) | Err(StoreError::NamespaceAlreadyExists(_)) => {}
            Err(e) => return Err(e.into()),
        }
        let lifecycle = Arc::new(LifecycleStore::open(overlay.clone()).await?);
        let queue = Arc::new(TaskQueue::new(config.max_concurrent));
        let materializer = Arc::new(Materializer::new(config.workspaces_root(), overlay.clone()));

        Ok(Arc::new(Self {
            config,
            overlay,
            lifecycle,
            queue,
            materializer,
            generator,
            executor,
            llm,
            stable_write_lock: Arc::new(AsyncMutex::new(())),
        }))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn overlay(&self) -> &Arc<OverlayStore> {
        &self.overlay
    }

    // -- operator-facing operations (§6.4) -----------------------------

    pub async fn spawn(&self, task_text: String, priority: Priority) -> Result<AgentId, OrchestratorError> {
        let agent_id = AgentId::generate();
        let record = LifecycleRecord::spawn(agent_id.clone(), task_text.clone(), priority, now_ms());
        self.lifecycle.put(&record).await?;
        self.queue.enqueue(task_text, priority, Some(agent_id.to_string()));
        Ok(agent_id)
    }

    pub async fn accept(&self, agent_id: &AgentId) -> Result<(), OrchestratorError> {
        let mut record = self.get_record(agent_id).await?;
        if record.state != LifecycleState::Completed {
            return Err(OrchestratorError::Invalid(format!(
                "cannot accept agent {agent_id} in state {}",
                record.state
            )));
        }

        let agent_ns = NamespaceId::for_agent(agent_id);
        let changed = record.changed_files.clone().unwrap_or_default();
        {
            // Hold the stable-write lock across the whole merge so no
            // watcher event for one of these paths interleaves mid-accept.
            let _guard = self.stable_write_lock.lock().await;
            for path in &changed {
                match self.overlay.read_file(&agent_ns, path).await {
                    Ok(bytes) => self.overlay.write_file(&NamespaceId::stable(), path, bytes).await?,
                    Err(StoreError::FileNotFound(_)) => {
                        self.overlay.delete_file(&NamespaceId::stable(), path).await?;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        record
            .transition(LifecycleState::Accepted, now_ms())
            .map_err(|e| OrchestratorError::Invalid(e.to_string()))?;
        self.lifecycle.put(&record).await?;
        self.cleanup_agent(agent_id).await?;
        Ok(())
    }

    /// Idempotent: rejecting an already-REJECTED agent is a no-op success.
    /// Rejecting a RUNNING agent is permitted (§4.8); the runner's eventual
    /// terminal transition then simply fails and is ignored (§9: rejecting
    /// a RUNNING agent discards whatever the executor later produces rather
    /// than cancelling it outright — see the Open Question in DESIGN.md).
    pub async fn reject(&self, agent_id: &AgentId) -> Result<(), OrchestratorError> {
        let mut record = self.get_record(agent_id).await?;
        match record.state {
            LifecycleState::Rejected => Ok(()),
            LifecycleState::Completed | LifecycleState::Running => {
                if record.error.is_none() {
                    record.error = Some("rejected by operator".to_string());
                }
                record
                    .transition(LifecycleState::Rejected, now_ms())
                    .map_err(|e| OrchestratorError::Invalid(e.to_string()))?;
                self.lifecycle.put(&record).await?;
                self.cleanup_agent(agent_id).await?;
                Ok(())
            }
            other => Err(OrchestratorError::Invalid(format!(
                "cannot reject agent {agent_id} in state {other}"
            ))),
        }
    }

    pub async fn get_lifecycle(&self, agent_id: &AgentId) -> Result<Option<LifecycleRecord>, OrchestratorError> {
        match self.lifecycle.get(agent_id).await {
            Ok(record) => Ok(Some(record)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_lifecycles(&self) -> Result<Vec<LifecycleRecord>, OrchestratorError> {
        Ok(self.lifecycle.list().await?)
    }

    async fn get_record(&self, agent_id: &AgentId) -> Result<LifecycleRecord, OrchestratorError> {
        match self.lifecycle.get(agent_id).await {
            Ok(record) => Ok(record),
            Err(e) if is_not_found(&e) => Err(OrchestratorError::NotFound(format!("agent {agent_id}"))),
            Err(e) => Err(e.into()),
        }
    }

    async fn cleanup_agent(&self, agent_id: &AgentId) -> Result<(), OrchestratorError> {
        self.materializer.cleanup(agent_id).await?;
        let ns = NamespaceId::for_agent(agent_id);
        match self.overlay.destroy_namespace(&ns).await {
            Ok(()) | Err(StoreError::NamespaceNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        let preview = self.config.preview_path(agent_id);
        if tokio::fs::try_exists(&preview).await.unwrap_or(false) {
            let _ = tokio::fs::remove_file(&preview).await;
        }
        Ok(())
    }

    // -- recovery, admission, retention (§4.8) -------------------------

    /// Repairs any RUNNING record left behind by a prior crash to REJECTED.
    /// Idempotent: a second call finds no RUNNING records left and is a
    /// no-op. Returns the number of records repaired.
    pub async fn recover(&self) -> Result<usize, OrchestratorError> {
        let records = self.lifecycle.list().await?;
        let mut repaired = 0;
        for mut record in records {
            if record.state != LifecycleState::Running {
                continue;
            }
            let db_path = self.config.overlay_root().join(format!("{}.db", record.agent_id.as_str()));
            let namespace_exists = tokio::fs::try_exists(&db_path).await.unwrap_or(false);
            record.error = Some(
                if namespace_exists {
                    "orphaned by restart".to_string()
                } else {
                    "agent namespace missing after restart".to_string()
                },
            );
            record
                .transition(LifecycleState::Rejected, now_ms())
                .map_err(|e| OrchestratorError::Invalid(e.to_string()))?;
            self.lifecycle.put(&record).await?;
            repaired += 1;
        }
        Ok(repaired)
    }

    /// Dequeues at most one task and spawns its runner. Returns whether a
    /// task was admitted, so callers (tests, the admission loop) can poll
    /// without guessing queue depth.
    pub fn admission_tick(self: &Arc<Self>) -> bool {
        let Some(task) = self.queue.try_dequeue() else {
            return false;
        };
        let agent_id = AgentId::from_string(task.source.unwrap_or_default());
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run_one(agent_id).await });
        true
    }

    async fn run_one(self: Arc<Self>, agent_id: AgentId) {
        let deadline = self.config.runner_deadline;
        let run = cairn_engine::run_agent(
            agent_id.clone(),
            self.overlay.clone(),
            self.lifecycle.clone(),
            self.generator.clone(),
            self.executor.clone(),
            self.llm.clone(),
            self.config.executor_deadline,
            now_ms,
        );
        if tokio::time::timeout(deadline, run).await.is_err() {
            tracing::warn!(%agent_id, "runner deadline exceeded, rejecting");
            if let Ok(mut record) = self.lifecycle.get(&agent_id).await {
                if !record.state.is_terminal() {
                    record.error = Some("run deadline exceeded".to_string());
                    if record.transition(LifecycleState::Rejected, now_ms()).is_ok() {
                        let _ = self.lifecycle.put(&record).await;
                    }
                }
            }
        }

        // A completed run is now awaiting operator review: materialise its
        // effective view so `cairn status`/editors can inspect it before
        // accept/reject. Best-effort — a failure here never blocks the
        // terminal lifecycle state from standing.
        if let Ok(record) = self.lifecycle.get(&agent_id).await {
            if record.state == LifecycleState::Completed {
                let namespace = NamespaceId::for_agent(&agent_id);
                if let Err(e) = self.materializer.materialize(&agent_id, &namespace).await {
                    tracing::warn!(%agent_id, error = %e, "failed to materialize completed agent workspace");
                }
            }
        }

        self.queue.mark_done();
    }

    /// One retention sweep (§4.8): purges terminal lifecycle records past
    /// `retention_age` and sweeps stale, undispatched signal tokens (§4.6).
    /// Returns the number of lifecycle records purged.
    pub async fn retention_tick(&self) -> Result<usize, OrchestratorError> {
        let records = self.lifecycle.list().await?;
        let now = now_ms();
        let retention_ms = self.config.retention_age.as_millis() as u64;
        let mut purged = 0;
        for record in records {
            if !record.is_retention_eligible(now, retention_ms) {
                continue;
            }
            if let Err(e) = self.lifecycle.remove(&record.agent_id).await {
                tracing::warn!(agent_id = %record.agent_id, error = %e, "failed to purge lifecycle record");
                continue;
            }
            if let Err(e) = self.cleanup_agent(&record.agent_id).await {
                tracing::warn!(agent_id = %record.agent_id, error = %e, "failed to clean up purged agent");
            }
            purged += 1;
        }

        if let Err(e) = cairn_watch::sweep_stale_dir(&self.config.signals_dir(), self.config.signal_stale_after).await
        {
            tracing::warn!(error = %e, "failed to sweep stale signal tokens");
        }
        Ok(purged)
    }

    /// Runs the full event loop (watcher, signal watcher, admission,
    /// retention) until `cancel` fires, then waits up to `shutdown_grace`
    /// for the spawned tasks to unwind before returning.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) -> Result<(), OrchestratorError> {
        let watcher = FileWatcher::new(FileWatcherConfig::new(self.config.project_dir.clone()), self.overlay.clone());
        let watcher_handle = tokio::spawn(watcher.run(cancel.clone()));

        let signal_config = SignalWatcherConfig {
            signals_dir: self.config.signals_dir(),
            poll_interval: self.config.signal_poll_interval,
            stale_after: self.config.signal_stale_after,
        };
        let signal_sink = OrchestratorSignalSink(Arc::clone(&self));
        let signal_watcher = SignalWatcher::new(signal_config, signal_sink);
        let signal_handle = tokio::spawn(signal_watcher.run(cancel.clone()));

        let admission_orchestrator = Arc::clone(&self);
        let admission_interval = self.config.admission_interval;
        let admission_cancel = cancel.clone();
        let admission_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = admission_cancel.cancelled() => break,
                    _ = tokio::time::sleep(admission_interval) => {
                        admission_orchestrator.admission_tick();
                    }
                }
            }
        });

        let retention_orchestrator = Arc::clone(&self);
        let retention_interval = self.config.retention_interval;
        let retention_cancel = cancel.clone();
        let retention_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = retention_cancel.cancelled() => break,
                    _ = tokio::time::sleep(retention_interval) => {
                        if let Err(e) = retention_orchestrator.retention_tick().await {
                            tracing::warn!(error = %e, "retention tick failed");
                        }
                    }
                }
            }
        });

        cancel.cancelled().await;
        let grace = self.config.shutdown_grace;
        let joined = tokio::time::timeout(grace, async {
            let _ = tokio::join!(watcher_handle, signal_handle, admission_handle, retention_handle);
        })
        .await;
        if joined.is_err() {
            tracing::warn!("shutdown grace period elapsed before all tasks unwound");
        }
        Ok(())
    }
}

struct OrchestratorSignalSink(Arc<Orchestrator>);

#[async_trait::async_trait]
impl cairn_watch::SignalSink for OrchestratorSignalSink {
    async fn dispatch(&self, signal: Signal) -> Result<(), String> {
        match signal {
            Signal::Accept(id) => self.0.accept(&id).await.map_err(|e| e.to_string()),
            Signal::Reject(id) => self.0.reject(&id).await.map_err(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
