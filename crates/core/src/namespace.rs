// SPDX-License-Identifier: MIT

//! Namespace identifiers for the overlay store.
//!
//! A [`NamespaceId`] names one overlay: the fixed `"stable"` namespace that
//! mirrors the developer's on-disk project, or one agent namespace
//! (`"agent-<uuid>"`) whose reads fall through to a parent.

use crate::id::AgentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the ground-truth namespace. Fixed for the life of the project.
pub const STABLE_NAMESPACE: &str = "stable";

/// A namespace identifier: `"stable"` or `"agent-<uuid>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceId(String);

impl NamespaceId {
    /// The fixed stable namespace.
    pub fn stable() -> Self {
        Self(STABLE_NAMESPACE.to_string())
    }

    /// The namespace owned by a given agent.
    pub fn for_agent(agent_id: &AgentId) -> Self {
        Self(agent_id.as_str().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_stable(&self) -> bool {
        self.0 == STABLE_NAMESPACE
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NamespaceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NamespaceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for NamespaceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "namespace_tests.rs"]
mod tests;
