// SPDX-License-Identifier: MIT

//! Polls `<cairn_home>/signals/` for `accept-<id>`/`reject-<id>` tokens and
//! forwards them to the orchestrator. See `§4.6`: tokens are consumed
//! exactly once and every dispatch failure is swallowed so one bad token
//! never wedges the poll loop.

use crate::WatchError;
use cairn_core::AgentId;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tokio_util::sync::CancellationToken;

const ACCEPT_PREFIX: &str = "accept-";
const REJECT_PREFIX: &str = "reject-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Accept(AgentId),
    Reject(AgentId),
}

#[derive(Debug, Clone)]
pub struct SignalWatcherConfig {
    pub signals_dir: PathBuf,
    pub poll_interval: Duration,
    /// Tokens older than this are stale and swept without dispatch.
    pub stale_after: Duration,
}

impl SignalWatcherConfig {
    pub fn new(signals_dir: impl Into<PathBuf>) -> Self {
        Self {
            signals_dir: signals_dir.into(),
            poll_interval: Duration::from_millis(500),
            stale_after: Duration::from_secs(5 * 60),
        }
    }
}

/// A single dispatch callback: maps a parsed [`Signal`] to orchestrator
/// action. Errors are logged and otherwise ignored — the token is removed
/// regardless of outcome.
#[async_trait::async_trait]
pub trait SignalSink: Send + Sync {
    async fn dispatch(&self, signal: Signal) -> Result<(), String>;
}

pub struct SignalWatcher<S: SignalSink> {
    config: SignalWatcherConfig,
    sink: S,
}

impl<S: SignalSink> SignalWatcher<S> {
    pub fn new(config: SignalWatcherConfig, sink: S) -> Self {
        Self { config, sink }
    }

    /// Polls until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), WatchError> {
        tokio::fs::create_dir_all(&self.config.signals_dir).await?;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {
                    if let Err(e) = self.poll_once().await {
                        tracing::warn!(error = %e, "signal watcher poll failed, continuing");
                    }
                }
            }
        }
        Ok(())
    }

    async fn poll_once(&self) -> Result<(), WatchError> {
        let mut entries = tokio::fs::read_dir(&self.config.signals_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(signal) = parse_token(name) else {
                continue;
            };
            match self.sink.dispatch(signal).await {
                Ok(()) => {}
                Err(e) => tracing::warn!(token = %name, error = %e, "signal dispatch failed"),
            }
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!(token = %name, error = %e, "failed to remove consumed signal token");
            }
        }
        Ok(())
    }

    /// Removes tokens older than `stale_after` without dispatching them.
    /// Called from the orchestrator's retention loop.
    pub async fn sweep_stale(&self) -> Result<usize, WatchError> {
        sweep_stale_dir(&self.config.signals_dir, self.config.stale_after).await
    }
}

/// Removes stale signal tokens from `signals_dir` without dispatching them.
/// Standalone so the orchestrator's retention loop can sweep without owning
/// a live [`SignalWatcher`] (which otherwise requires a [`SignalSink`]).
pub async fn sweep_stale_dir(signals_dir: &std::path::Path, stale_after: Duration) -> Result<usize, WatchError> {
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(signals_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if parse_token(name).is_none() {
            continue;
        }
        let metadata = entry.metadata().await?;
        let age = metadata
            .modified()
            .ok()
            .and_then(|m| SystemTime::now().duration_since(m).ok())
            .unwrap_or_default();
        if age >= stale_after {
            tokio::fs::remove_file(&path).await?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn parse_token(name: &str) -> Option<Signal> {
    if let Some(id) = name.strip_prefix(ACCEPT_PREFIX) {
        Some(Signal::Accept(AgentId::from_string(id)))
    } else if let Some(id) = name.strip_prefix(REJECT_PREFIX) {
        Some(Signal::Reject(AgentId::from_string(id)))
    } else {
        None
    }
}

#[cfg(test)]
#[path = "signal_watcher_tests.rs"]
mod tests;
