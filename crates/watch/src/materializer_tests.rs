// SPDX-License-Identifier: MIT

use super::*;
use cairn_core::NamespaceId;

async fn fresh() -> (tempfile::TempDir, Arc<OverlayStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(OverlayStore::new(dir.path().join(".agentfs")).await.unwrap());
    (dir, store)
}

#[tokio::test]
async fn materializes_stable_files() {
    let (dir, overlay) = fresh().await;
    let stable = NamespaceId::stable();
    overlay.open_namespace(stable.clone(), None).await.unwrap();
    overlay
        .write_file(&stable, "README.md", b"hello".to_vec())
        .await
        .unwrap();

    let materializer = Materializer::new(dir.path().join("workspaces"), overlay);
    let agent_id = AgentId::generate();
    let target = materializer.materialize(&agent_id, &stable).await.unwrap();

    let contents = tokio::fs::read(target.join("README.md")).await.unwrap();
    assert_eq!(contents, b"hello");
}

#[tokio::test]
async fn materialize_replaces_prior_contents() {
    let (dir, overlay) = fresh().await;
    let stable = NamespaceId::stable();
    overlay.open_namespace(stable.clone(), None).await.unwrap();
    overlay.write_file(&stable, "a.txt", b"a".to_vec()).await.unwrap();

    let materializer = Materializer::new(dir.path().join("workspaces"), overlay.clone());
    let agent_id = AgentId::generate();
    materializer.materialize(&agent_id, &stable).await.unwrap();

    overlay.delete_file(&stable, "a.txt").await.unwrap();
    overlay.write_file(&stable, "b.txt", b"b".to_vec()).await.unwrap();
    let target = materializer.materialize(&agent_id, &stable).await.unwrap();

    assert!(!target.join("a.txt").exists());
    assert_eq!(tokio::fs::read(target.join("b.txt")).await.unwrap(), b"b");
}

#[tokio::test]
async fn honors_tombstones_in_agent_view() {
    let (dir, overlay) = fresh().await;
    let stable = NamespaceId::stable();
    let agent = NamespaceId::from("agent-1");
    overlay.open_namespace(stable.clone(), None).await.unwrap();
    overlay.write_file(&stable, "old.txt", b"keep".to_vec()).await.unwrap();
    overlay
        .open_namespace(agent.clone(), Some(stable.clone()))
        .await
        .unwrap();
    overlay.delete_file(&agent, "old.txt").await.unwrap();

    let materializer = Materializer::new(dir.path().join("workspaces"), overlay);
    let agent_id = AgentId::from_string("agent-1");
    let target = materializer.materialize(&agent_id, &agent).await.unwrap();

    assert!(!target.join("old.txt").exists());
}

#[tokio::test]
async fn cleanup_is_idempotent() {
    let (dir, overlay) = fresh().await;
    let stable = NamespaceId::stable();
    overlay.open_namespace(stable.clone(), None).await.unwrap();
    let materializer = Materializer::new(dir.path().join("workspaces"), overlay);
    let agent_id = AgentId::generate();

    materializer.cleanup(&agent_id).await.unwrap();
    materializer.materialize(&agent_id, &stable).await.unwrap();
    materializer.cleanup(&agent_id).await.unwrap();
    materializer.cleanup(&agent_id).await.unwrap();

    assert!(!materializer.workspace_dir(&agent_id).exists());
}
