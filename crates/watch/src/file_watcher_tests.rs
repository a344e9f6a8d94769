// SPDX-License-Identifier: MIT

use super::*;
use cairn_overlay::OverlayStore;
use std::time::Duration;

async fn fresh_watcher(project_dir: &Path) -> (Arc<OverlayStore>, FileWatcher) {
    let store_dir = project_dir.join(".agentfs");
    let overlay = Arc::new(OverlayStore::new(store_dir).await.unwrap());
    overlay
        .open_namespace(NamespaceId::stable(), None)
        .await
        .unwrap();
    let config = FileWatcherConfig::new(project_dir);
    let watcher = FileWatcher::new(config, overlay.clone());
    (overlay, watcher)
}

#[tokio::test]
async fn create_mirrors_into_stable() {
    let project = tempfile::tempdir().unwrap();
    let (overlay, watcher) = fresh_watcher(project.path()).await;
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let handle = tokio::spawn(watcher.run(cancel));

    tokio::time::sleep(Duration::from_millis(100)).await;
    tokio::fs::write(project.path().join("a.txt"), b"hello").await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    token.cancel();
    handle.await.unwrap().unwrap();

    let bytes = overlay.read_file(&NamespaceId::stable(), "a.txt").await.unwrap();
    assert_eq!(bytes, b"hello");
}

#[tokio::test]
async fn delete_tombstones_in_stable() {
    let project = tempfile::tempdir().unwrap();
    let (overlay, watcher) = fresh_watcher(project.path()).await;
    let path = project.path().join("b.txt");
    tokio::fs::write(&path, b"bye").await.unwrap();
    overlay
        .write_file(&NamespaceId::stable(), "b.txt", b"bye".to_vec())
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let handle = tokio::spawn(watcher.run(cancel));

    tokio::time::sleep(Duration::from_millis(100)).await;
    tokio::fs::remove_file(&path).await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    token.cancel();
    handle.await.unwrap().unwrap();

    let err = overlay
        .read_file(&NamespaceId::stable(), "b.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, cairn_overlay::StoreError::FileNotFound(_)));
}

#[tokio::test]
async fn ignores_the_overlay_store_directory() {
    let project = tempfile::tempdir().unwrap();
    let (_overlay, watcher) = fresh_watcher(project.path()).await;
    assert!(watcher.is_ignored(&project.path().join(".agentfs").join("stable.db")));
    assert!(!watcher.is_ignored(&project.path().join("src/main.rs")));
}

#[tokio::test]
async fn relative_path_strips_project_dir_and_rejects_the_root_itself() {
    let project = tempfile::tempdir().unwrap();
    let (_overlay, watcher) = fresh_watcher(project.path()).await;
    let rel = watcher.relative_path(&project.path().join("src/main.rs"));
    assert_eq!(rel.as_deref(), Some("src/main.rs"));
    assert_eq!(watcher.relative_path(project.path()), None);
}
