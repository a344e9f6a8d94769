// SPDX-License-Identifier: MIT

//! The `submit_result` payload: the one piece of duck-typed JSON the
//! original design passed straight through. Here it is a concrete struct
//! parsed with `serde_json`, so a malformed payload fails at deserialisation
//! rather than at some later field access — any parse failure maps onto
//! [`crate::CairnError::Invalid`] by the caller.

use serde::{Deserialize, Serialize};

/// What an agentlet reports when it calls `submit_result(summary, changed_files)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub summary: String,
    pub changed_files: Vec<String>,
}

impl Submission {
    pub fn new(summary: impl Into<String>, changed_files: Vec<String>) -> Self {
        Self { summary: summary.into(), changed_files }
    }

    /// Parse and validate a raw KV payload. Strict: any shape other than
    /// `{summary: string, changed_files: [string]}` is rejected rather than
    /// coerced, per the "duck-typed submission JSON" redesign note.
    pub fn parse(bytes: &[u8]) -> Result<Self, crate::CairnError> {
        serde_json::from_slice::<Submission>(bytes)
            .map_err(|e| crate::CairnError::invalid(format!("malformed submission: {e}")))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        // A Submission only ever holds valid UTF-8 strings it was built from,
        // so serialisation cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "submission_tests.rs"]
mod tests;
