// SPDX-License-Identifier: MIT

//! The capability table passed to the executor: the fixed set of host
//! functions generated agentlet code may call, all scoped to one agent's
//! namespace. Path arguments are validated for traversal attempts by the
//! overlay store itself (`§6.1`: reject any path containing `..` or
//! resolving outside the namespace), so this layer adds no separate check.

use crate::collaborators::LlmCollaborator;
use crate::EngineError;
use cairn_core::{CairnError, NamespaceId};
use cairn_overlay::OverlayStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMatch {
    pub file: String,
    pub line: usize,
    pub text: String,
}

/// One agent's view onto the host functions its generated code may call.
pub struct CapabilityTable {
    overlay: Arc<OverlayStore>,
    namespace: NamespaceId,
    llm: Option<Arc<dyn LlmCollaborator>>,
}

impl CapabilityTable {
    pub fn new(
        overlay: Arc<OverlayStore>,
        namespace: NamespaceId,
        llm: Option<Arc<dyn LlmCollaborator>>,
    ) -> Self {
        Self {
            overlay,
            namespace,
            llm,
        }
    }

    pub async fn read_file(&self, path: &str) -> Result<Vec<u8>, EngineError> {
        Ok(self.overlay.read_file(&self.namespace, path).await?)
    }

    pub async fn write_file(&self, path: &str, content: Vec<u8>) -> Result<bool, EngineError> {
        self.overlay.write_file(&self.namespace, path, content).await?;
        Ok(true)
    }

    pub async fn list_dir(&self, path: &str) -> Result<Vec<String>, EngineError> {
        Ok(self.overlay.list_dir(&self.namespace, path).await?)
    }

    pub async fn file_exists(&self, path: &str) -> Result<bool, EngineError> {
        Ok(self.overlay.file_exists(&self.namespace, path).await?)
    }

    /// Filenames (full relative paths) matching `glob_pattern` anywhere in
    /// the effective view.
    pub async fn search_files(&self, glob_pattern: &str) -> Result<Vec<String>, EngineError> {
        let pattern = glob::Pattern::new(glob_pattern)?;
        let paths = self.overlay.effective_paths(&self.namespace, "").await?;
        Ok(paths.into_iter().filter(|p| pattern.matches(p)).collect())
    }

    /// Content search across the effective view, or a single path when
    /// given. Binary (non-UTF-8) files are skipped rather than erroring.
    pub async fn search_content(
        &self,
        pattern: &str,
        path: Option<&str>,
    ) -> Result<Vec<ContentMatch>, EngineError> {
        let re = regex::Regex::new(pattern)?;
        let candidates = match path {
            Some(p) => vec![p.to_string()],
            None => self.overlay.effective_paths(&self.namespace, "").await?,
        };

        let mut matches = Vec::new();
        for file in candidates {
            let bytes = match self.overlay.read_file(&self.namespace, &file).await {
                Ok(bytes) => bytes,
                Err(cairn_overlay::StoreError::FileNotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            };
            let Ok(text) = String::from_utf8(bytes) else {
                continue;
            };
            for (idx, line) in text.lines().enumerate() {
                if re.is_match(line) {
                    matches.push(ContentMatch {
                        file: file.clone(),
                        line: idx + 1,
                        text: line.to_string(),
                    });
                }
            }
        }
        Ok(matches)
    }

    pub async fn ask_llm(&self, prompt: &str, context: Option<&str>) -> Result<String, EngineError> {
        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| EngineError::Executor("no llm collaborator configured".to_string()))?;
        llm.ask(prompt, context)
            .await
            .map_err(EngineError::Executor)
    }

    /// Writes `{summary, changed_files}` under KV key `submission`.
    pub async fn submit_result(
        &self,
        summary: &str,
        changed_files: Vec<String>,
    ) -> Result<bool, EngineError> {
        let submission = cairn_core::Submission::new(summary, changed_files);
        self.overlay
            .set_kv(&self.namespace, "submission", submission.to_bytes())
            .await?;
        Ok(true)
    }

    /// Appends one line to the per-agent log KV entry.
    pub async fn log(&self, message: &str) -> Result<bool, EngineError> {
        let existing = match self.overlay.get_kv(&self.namespace, "log").await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(cairn_overlay::StoreError::FileNotFound(_)) => String::new(),
            Err(e) => return Err(e.into()),
        };
        let mut updated = existing;
        if !updated.is_empty() {
            updated.push('\n');
        }
        updated.push_str(message);
        self.overlay
            .set_kv(&self.namespace, "log", updated.into_bytes())
            .await?;
        Ok(true)
    }

    /// Fetches the `submission` KV entry written by `submit_result`, if any.
    pub async fn read_submission(&self) -> Result<Option<cairn_core::Submission>, EngineError> {
        match self.overlay.get_kv(&self.namespace, "submission").await {
            Ok(bytes) => Ok(Some(cairn_core::Submission::parse(&bytes).map_err(map_submission_err)?)),
            Err(cairn_overlay::StoreError::FileNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn map_submission_err(e: CairnError) -> EngineError {
    EngineError::Invalid(e.to_string())
}

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;
