// SPDX-License-Identifier: MIT

//! The namespace registry and its SQLite-backed read-fallthrough content
//! store. See `§4.1` for the operation contract this module implements.

use crate::error::StoreError;
use cairn_core::NamespaceId;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS files (
    path      TEXT PRIMARY KEY,
    bytes     BLOB NOT NULL,
    size      INTEGER NOT NULL,
    mtime     INTEGER NOT NULL,
    tombstone INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY,
    value BLOB NOT NULL
);
";

struct NamespaceHandle {
    parent: Option<NamespaceId>,
    conn: Mutex<Connection>,
}

/// A namespaced, read-fallthrough content store. One SQLite file per
/// namespace lives under `root/<namespace>.db`.
pub struct OverlayStore {
    root: PathBuf,
    namespaces: tokio::sync::RwLock<HashMap<NamespaceId, Arc<NamespaceHandle>>>,
}

impl OverlayStore {
    /// Open (creating if absent) a store rooted at `root`. Does not open any
    /// namespace; call [`OverlayStore::open_namespace`] for each one you need,
    /// including the stable namespace.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            namespaces: tokio::sync::RwLock::new(HashMap::new()),
        })
    }

    fn db_path(&self, id: &NamespaceId) -> PathBuf {
        self.root.join(format!("{}.db", id.as_str()))
    }

    /// Open a namespace backed by its own SQLite file, creating the schema if
    /// this is the first time. `parent` names the namespace reads fall
    /// through to; `None` for the stable (root) namespace.
    pub async fn open_namespace(
        &self,
        id: NamespaceId,
        parent: Option<NamespaceId>,
    ) -> Result<(), StoreError> {
        let path = self.db_path(&id);
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, StoreError> {
            let conn = Connection::open(path)?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await??;

        let handle = Arc::new(NamespaceHandle {
            parent,
            conn: Mutex::new(conn),
        });
        let mut guard = self.namespaces.write().await;
        if guard.contains_key(&id) {
            return Err(StoreError::NamespaceAlreadyExists(id.to_string()));
        }
        guard.insert(id, handle);
        Ok(())
    }

    /// Drop a namespace's in-memory handle without deleting its backing file.
    pub async fn close_namespace(&self, id: &NamespaceId) -> Result<(), StoreError> {
        let mut guard = self.namespaces.write().await;
        guard
            .remove(id)
            .ok_or_else(|| StoreError::NamespaceNotFound(id.to_string()))?;
        Ok(())
    }

    /// Close and permanently delete a namespace's backing file. Used once an
    /// agent's work has been accepted or rejected and its namespace is no
    /// longer needed.
    pub async fn destroy_namespace(&self, id: &NamespaceId) -> Result<(), StoreError> {
        self.close_namespace(id).await?;
        let path = self.db_path(id);
        if tokio::fs::try_exists(&path).await? {
            tokio::fs::remove_file(path).await?;
        }
        Ok(())
    }

    async fn handle(&self, id: &NamespaceId) -> Result<Arc<NamespaceHandle>, StoreError> {
        self.namespaces
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NamespaceNotFound(id.to_string()))
    }

    /// The chain of namespace handles from `id` up through its ancestors,
    /// closest first. Used to resolve fallthrough reads without holding the
    /// registry lock across the blocking SQLite calls.
    async fn chain(&self, id: &NamespaceId) -> Result<Vec<Arc<NamespaceHandle>>, StoreError> {
        let mut out = Vec::new();
        let mut current = Some(id.clone());
        while let Some(next) = current {
            let handle = self.handle(&next).await?;
            current = handle.parent.clone();
            out.push(handle);
        }
        Ok(out)
    }

    pub async fn write_file(
        &self,
        ns: &NamespaceId,
        path: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StoreError> {
        let path = normalize_path(path)?;
        let handle = self.handle(ns).await?;
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let conn = handle.conn.lock();
            let mtime = now_ms();
            conn.execute(
                "INSERT INTO files (path, bytes, size, mtime, tombstone)
                 VALUES (?1, ?2, ?3, ?4, 0)
                 ON CONFLICT(path) DO UPDATE SET
                     bytes = excluded.bytes,
                     size = excluded.size,
                     mtime = excluded.mtime,
                     tombstone = 0",
                params![path, bytes, bytes_len(&bytes), mtime],
            )?;
            Ok(())
        })
        .await?
    }

    /// Reads a path, falling through to ancestor namespaces when it is
    /// absent locally. A tombstone at any level stops the fallthrough and
    /// reports `NotFound`, even if an ancestor still has the file.
    pub async fn read_file(&self, ns: &NamespaceId, path: &str) -> Result<Vec<u8>, StoreError> {
        let path = normalize_path(path)?;
        let query_path = path.clone();
        let chain = self.chain(ns).await?;
        let found = tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>, StoreError> {
            for handle in &chain {
                let conn = handle.conn.lock();
                let row: Option<(Vec<u8>, i64)> = conn
                    .query_row(
                        "SELECT bytes, tombstone FROM files WHERE path = ?1",
                        params![query_path],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;
                match row {
                    Some((_, tombstone)) if tombstone != 0 => return Ok(None),
                    Some((bytes, _)) => return Ok(Some(bytes)),
                    None => continue,
                }
            }
            Ok(None)
        })
        .await??;
        found.ok_or_else(|| StoreError::FileNotFound(path_display(ns, &path)))
    }

    pub async fn file_exists(&self, ns: &NamespaceId, path: &str) -> Result<bool, StoreError> {
        match self.read_file(ns, path).await {
            Ok(_) => Ok(true),
            Err(StoreError::FileNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Deletes a path. In a namespace with a parent, this writes a
    /// tombstone so the parent's copy stays intact and future reads report
    /// not-found. In the root (parentless) namespace, there is nothing to
    /// shadow, so the row is hard-deleted.
    pub async fn delete_file(&self, ns: &NamespaceId, path: &str) -> Result<(), StoreError> {
        let path = normalize_path(path)?;
        let handle = self.handle(ns).await?;
        let has_parent = handle.parent.is_some();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let conn = handle.conn.lock();
            if has_parent {
                let mtime = now_ms();
                conn.execute(
                    "INSERT INTO files (path, bytes, size, mtime, tombstone)
                     VALUES (?1, X'', 0, ?2, 1)
                     ON CONFLICT(path) DO UPDATE SET
                         bytes = X'', size = 0, mtime = excluded.mtime, tombstone = 1",
                    params![path, mtime],
                )?;
            } else {
                conn.execute("DELETE FROM files WHERE path = ?1", params![path])?;
            }
            Ok(())
        })
        .await?
    }

    /// Lists the immediate children (files and subdirectory names, not full
    /// paths) visible under `dir`, merging every namespace in the chain and
    /// honoring tombstones. `dir` is `""` for the namespace root.
    pub async fn list_dir(&self, ns: &NamespaceId, dir: &str) -> Result<Vec<String>, StoreError> {
        let dir = normalize_dir(dir)?;
        let visible = self.effective_paths(ns, &dir).await?;
        Ok(bucket_children(&dir, visible))
    }

    /// Every full file path visible from `ns` under `dir`, merging the
    /// whole fallthrough chain and honoring tombstones, without bucketing
    /// into immediate children. Used by the capability table's
    /// `search_files`/`search_content` to walk a namespace's effective view.
    pub async fn effective_paths(
        &self,
        ns: &NamespaceId,
        dir: &str,
    ) -> Result<Vec<String>, StoreError> {
        let dir = normalize_dir(dir)?;
        let chain = self.chain(ns).await?;
        let dir_for_query = dir.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<String>, StoreError> {
            let mut decided: HashSet<String> = HashSet::new();
            let mut visible: Vec<String> = Vec::new();
            for handle in &chain {
                let conn = handle.conn.lock();
                let mut stmt = if dir_for_query.is_empty() {
                    conn.prepare("SELECT path, tombstone FROM files")?
                } else {
                    conn.prepare(
                        "SELECT path, tombstone FROM files
                         WHERE path = ?1 OR path LIKE ?1 || '/%'",
                    )?
                };
                let rows: Vec<(String, i64)> = if dir_for_query.is_empty() {
                    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                        .collect::<Result<_, _>>()?
                } else {
                    stmt.query_map(params![dir_for_query], |row| {
                        Ok((row.get(0)?, row.get(1)?))
                    })?
                    .collect::<Result<_, _>>()?
                };
                for (path, tombstone) in rows {
                    if !decided.insert(path.clone()) {
                        continue;
                    }
                    if tombstone == 0 {
                        visible.push(path);
                    }
                }
            }
            Ok(visible)
        })
        .await?
    }

    pub async fn set_kv(&self, ns: &NamespaceId, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let key = key.to_string();
        let handle = self.handle(ns).await?;
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            handle.conn.lock().execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
        .await?
    }

    pub async fn get_kv(&self, ns: &NamespaceId, key: &str) -> Result<Vec<u8>, StoreError> {
        let key_owned = key.to_string();
        let handle = self.handle(ns).await?;
        let found = tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>, StoreError> {
            Ok(handle
                .conn
                .lock()
                .query_row(
                    "SELECT value FROM kv WHERE key = ?1",
                    params![key_owned],
                    |row| row.get(0),
                )
                .optional()?)
        })
        .await??;
        found.ok_or_else(|| StoreError::FileNotFound(format!("kv key {key:?} in {ns}")))
    }

    pub async fn delete_kv(&self, ns: &NamespaceId, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        let handle = self.handle(ns).await?;
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            handle
                .conn
                .lock()
                .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await?
    }

    pub async fn list_kv(&self, ns: &NamespaceId) -> Result<Vec<String>, StoreError> {
        let handle = self.handle(ns).await?;
        tokio::task::spawn_blocking(move || -> Result<Vec<String>, StoreError> {
            let conn = handle.conn.lock();
            let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
            let keys = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(keys)
        })
        .await?
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn bytes_len(bytes: &[u8]) -> i64 {
    bytes.len() as i64
}

fn path_display(ns: &NamespaceId, path: &str) -> String {
    format!("{path} in namespace {ns}")
}

/// Rejects absolute paths and `.`/`..` segments; returns a normalized,
/// forward-slash relative path with no trailing slash.
fn normalize_path(path: &str) -> Result<String, StoreError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(StoreError::InvalidPath("empty path".into()));
    }
    let segments: Vec<&str> = path.split('/').collect();
    for seg in &segments {
        if seg.is_empty() || *seg == "." || *seg == ".." {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
    }
    Ok(segments.join("/"))
}

/// Like [`normalize_path`] but allows the empty string, meaning the
/// namespace root.
fn normalize_dir(dir: &str) -> Result<String, StoreError> {
    let dir = dir.trim().trim_matches('/');
    if dir.is_empty() {
        return Ok(String::new());
    }
    normalize_path(dir)
}

/// Given a flat set of visible full file paths, returns the sorted, deduped
/// set of immediate child names under `dir` (file names, or the top-level
/// segment of a name for nested subdirectories).
fn bucket_children(dir: &str, paths: Vec<String>) -> Vec<String> {
    let prefix = if dir.is_empty() {
        String::new()
    } else {
        format!("{dir}/")
    };
    let mut children: BTreeSet<String> = BTreeSet::new();
    for path in &paths {
        let Some(rest) = path.strip_prefix(&prefix) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let name = rest.split('/').next().unwrap_or(rest);
        children.insert(name.to_string());
    }
    children.into_iter().collect()
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
