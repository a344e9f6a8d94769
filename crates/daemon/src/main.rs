// SPDX-License-Identifier: MIT

//! `cairnd`: hosts one project's [`Orchestrator`] behind a Unix socket.
//!
//! Startup order follows this workspace's lock-then-bind convention (see
//! `crates/daemon/src/lifecycle/startup.rs` in the prior daemon generation):
//! acquire the PID lock first so two daemons never race for the same
//! project, only then remove a stale socket and bind.

use cairn_daemon::{Config, Listener, Orchestrator, OrchestratorError};
use cairn_daemon::collaborators::{UnconfiguredExecutor, UnconfiguredGenerator};
use fs2::FileExt;
use std::io::Write;
use std::sync::Arc;
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("another cairnd is already running for this project (lock at {0})")]
    LockHeld(std::path::PathBuf),
    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(std::path::PathBuf, std::io::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

fn init_tracing(logs_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    let _ = std::fs::create_dir_all(logs_dir);
    let file_appender = tracing_appender::rolling::daily(logs_dir, "cairnd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    guard
}

/// Acquires the exclusive PID lock, writing this process's PID once held.
/// Left locked for the life of the process; the OS releases it on exit.
fn acquire_lock(lock_path: &std::path::Path) -> Result<std::fs::File, StartupError> {
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|_| StartupError::LockHeld(lock_path.to_path_buf()))?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    Ok(lock_file)
}

fn cleanup_on_failure(config: &Config) {
    let socket_path = config.socket_path();
    if socket_path.exists() {
        let _ = std::fs::remove_file(&socket_path);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env();
    let _tracing_guard = init_tracing(&config.logs_dir());

    match run_inner(&config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if !matches!(e, StartupError::LockHeld(_)) {
                cleanup_on_failure(&config);
            }
            Err(e)
        }
    }
}

async fn run_inner(config: &Config) -> Result<(), StartupError> {
    let _lock_file = acquire_lock(&config.lock_path())?;

    let orchestrator = Orchestrator::new(
        config.clone(),
        Arc::new(UnconfiguredGenerator),
        Arc::new(UnconfiguredExecutor),
        None,
    )
    .await?;

    let repaired = orchestrator.recover().await?;
    if repaired > 0 {
        tracing::warn!(repaired, "repaired orphaned RUNNING lifecycle records from a prior crash");
    }

    let socket_path = config.socket_path();
    if socket_path.exists() {
        std::fs::remove_file(&socket_path)?;
    }
    let unix = UnixListener::bind(&socket_path).map_err(|e| StartupError::BindFailed(socket_path.clone(), e))?;

    tracing::info!(socket = %socket_path.display(), "cairnd ready");

    let cancel = CancellationToken::new();
    let listener = Listener::new(unix, Arc::clone(&orchestrator));
    let listener_handle = tokio::spawn(listener.run(cancel.clone()));
    let supervisor_handle = tokio::spawn(Arc::clone(&orchestrator).run(cancel.clone()));

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, draining");
    cancel.cancel();

    let grace = config.shutdown_grace;
    if tokio::time::timeout(grace, async {
        let _ = tokio::join!(listener_handle, supervisor_handle);
    })
    .await
    .is_err()
    {
        tracing::warn!("shutdown grace period elapsed before all tasks finished");
    }

    let _ = std::fs::remove_file(&socket_path);
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let sigterm = signal(SignalKind::terminate());
    let sigint = signal(SignalKind::interrupt());
    match (sigterm, sigint) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {}
                _ = sigint.recv() => {}
            }
        }
        _ => {
            // Signal handlers failed to install; fall back to Ctrl+C only
            // rather than leaving the daemon with no shutdown path at all.
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("cairnd: {e}");
        std::process::exit(1);
    }
}
