// SPDX-License-Identifier: MIT

use super::*;
use std::sync::Arc;
use tokio::sync::Mutex;

struct RecordingSink {
    seen: Arc<Mutex<Vec<Signal>>>,
    fail_on: Option<AgentId>,
}

#[async_trait::async_trait]
impl SignalSink for RecordingSink {
    async fn dispatch(&self, signal: Signal) -> Result<(), String> {
        if let Some(fail_id) = &self.fail_on {
            let matches = match &signal {
                Signal::Accept(id) | Signal::Reject(id) => id == fail_id,
            };
            if matches {
                return Err("boom".to_string());
            }
        }
        self.seen.lock().await.push(signal);
        Ok(())
    }
}

#[test]
fn parses_accept_and_reject_tokens() {
    assert_eq!(
        parse_token("accept-agent-1"),
        Some(Signal::Accept(AgentId::from_string("agent-1")))
    );
    assert_eq!(
        parse_token("reject-agent-2"),
        Some(Signal::Reject(AgentId::from_string("agent-2")))
    );
    assert_eq!(parse_token("not-a-token"), None);
}

#[tokio::test]
async fn poll_once_dispatches_and_removes_token() {
    let dir = tempfile::tempdir().unwrap();
    let config = SignalWatcherConfig::new(dir.path());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let watcher = SignalWatcher::new(
        config,
        RecordingSink {
            seen: seen.clone(),
            fail_on: None,
        },
    );

    let token = dir.path().join("accept-agent-9");
    tokio::fs::write(&token, b"").await.unwrap();

    watcher.poll_once().await.unwrap();

    assert!(!token.exists(), "token must be consumed exactly once");
    assert_eq!(
        seen.lock().await.as_slice(),
        &[Signal::Accept(AgentId::from_string("agent-9"))]
    );
}

#[tokio::test]
async fn token_is_removed_even_when_dispatch_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = SignalWatcherConfig::new(dir.path());
    let fail_id = AgentId::from_string("agent-bad");
    let watcher = SignalWatcher::new(
        config,
        RecordingSink {
            seen: Arc::new(Mutex::new(Vec::new())),
            fail_on: Some(fail_id),
        },
    );

    let token = dir.path().join("reject-agent-bad");
    tokio::fs::write(&token, b"").await.unwrap();

    watcher.poll_once().await.unwrap();

    assert!(!token.exists());
}

#[tokio::test]
async fn ignores_unrelated_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = SignalWatcherConfig::new(dir.path());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let watcher = SignalWatcher::new(
        config,
        RecordingSink {
            seen: seen.clone(),
            fail_on: None,
        },
    );

    let stray = dir.path().join("README.md");
    tokio::fs::write(&stray, b"hi").await.unwrap();

    watcher.poll_once().await.unwrap();

    assert!(stray.exists());
    assert!(seen.lock().await.is_empty());
}

#[tokio::test]
async fn sweep_stale_removes_old_tokens_without_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SignalWatcherConfig::new(dir.path());
    config.stale_after = std::time::Duration::from_millis(0);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let watcher = SignalWatcher::new(
        config,
        RecordingSink {
            seen: seen.clone(),
            fail_on: None,
        },
    );

    let token = dir.path().join("accept-agent-stale");
    tokio::fs::write(&token, b"").await.unwrap();

    let removed = watcher.sweep_stale().await.unwrap();

    assert_eq!(removed, 1);
    assert!(!token.exists());
    assert!(seen.lock().await.is_empty());
}
