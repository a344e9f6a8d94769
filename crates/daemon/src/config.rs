// SPDX-License-Identifier: MIT

//! Daemon configuration: paths under the project and under `cairn_home`,
//! plus the timing knobs named in `§4`/`§5`. Resolution order mirrors this
//! workspace's existing `OJ_STATE_DIR`-style env override convention:
//! explicit env var, then a computed default.

use std::path::PathBuf;
use std::time::Duration;

/// Resolves `cairn_home`: `CAIRN_HOME` env var, else `~/.local/state/cairn`.
pub fn cairn_home() -> PathBuf {
    if let Ok(dir) = std::env::var("CAIRN_HOME") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local/state/cairn")
}

/// Resolves the project directory being watched: `CAIRN_PROJECT_DIR` env
/// var, else the process's current working directory.
pub fn project_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CAIRN_PROJECT_DIR") {
        return PathBuf::from(dir);
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn env_duration_ms(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn env_usize(var: &str, default: usize) -> usize {
    std::env::var(var).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// Every timing/path knob the orchestrator's loops and stores need.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_dir: PathBuf,
    pub cairn_home: PathBuf,
    pub max_concurrent: usize,
    pub admission_interval: Duration,
    pub retention_interval: Duration,
    pub retention_age: Duration,
    pub signal_poll_interval: Duration,
    pub signal_stale_after: Duration,
    pub runner_deadline: Duration,
    pub executor_deadline: Duration,
    pub shutdown_grace: Duration,
}

impl Config {
    /// Builds a `Config` from environment variables layered over the
    /// defaults named in `§4`/`§5`:
    /// `CAIRN_MAX_CONCURRENT` (4), `CAIRN_ADMISSION_INTERVAL_MS` (100),
    /// `CAIRN_RETENTION_INTERVAL_MS` (60_000), `CAIRN_RETENTION_AGE_MS`
    /// (24h), `CAIRN_SIGNAL_POLL_MS` (500), `CAIRN_SIGNAL_STALE_MS` (5m),
    /// `CAIRN_RUNNER_DEADLINE_MS` (10m), `CAIRN_EXECUTOR_DEADLINE_MS` (60s).
    pub fn from_env() -> Self {
        Self {
            project_dir: project_dir(),
            cairn_home: cairn_home(),
            max_concurrent: env_usize("CAIRN_MAX_CONCURRENT", 4),
            admission_interval: env_duration_ms("CAIRN_ADMISSION_INTERVAL_MS", Duration::from_millis(100)),
            retention_interval: env_duration_ms("CAIRN_RETENTION_INTERVAL_MS", Duration::from_secs(60)),
            retention_age: env_duration_ms("CAIRN_RETENTION_AGE_MS", Duration::from_secs(24 * 60 * 60)),
            signal_poll_interval: env_duration_ms("CAIRN_SIGNAL_POLL_MS", Duration::from_millis(500)),
            signal_stale_after: env_duration_ms("CAIRN_SIGNAL_STALE_MS", Duration::from_secs(5 * 60)),
            runner_deadline: env_duration_ms("CAIRN_RUNNER_DEADLINE_MS", Duration::from_secs(10 * 60)),
            executor_deadline: env_duration_ms("CAIRN_EXECUTOR_DEADLINE_MS", Duration::from_secs(60)),
            shutdown_grace: Duration::from_secs(5),
        }
    }

    pub fn overlay_root(&self) -> PathBuf {
        self.project_dir.join(".agentfs")
    }

    pub fn workspaces_root(&self) -> PathBuf {
        self.cairn_home.join("workspaces")
    }

    pub fn signals_dir(&self) -> PathBuf {
        self.cairn_home.join("signals")
    }

    pub fn previews_dir(&self) -> PathBuf {
        self.cairn_home.join("previews")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.cairn_home.join("cairnd.sock")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.cairn_home.join("cairnd.lock")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.cairn_home.join("logs")
    }

    pub fn preview_path(&self, agent_id: &cairn_core::AgentId) -> PathBuf {
        self.previews_dir().join(format!("{agent_id}.diff"))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
