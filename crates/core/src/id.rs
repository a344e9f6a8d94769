// SPDX-License-Identifier: MIT

//! Agent identifiers.
//!
//! An [`AgentId`] is the identity of one agentlet: its overlay namespace is
//! named from it, its lifecycle record is keyed by it, and every
//! filesystem-visible artifact (materialised workspace, signal token,
//! preview diff) embeds it in a path. The format is `agent-<uuid v4>`.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

const PREFIX: &str = "agent-";

/// Unique identifier for one agentlet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Generate a fresh id: `"agent-" + uuid`.
    pub fn generate() -> Self {
        Self(format!("{PREFIX}{}", uuid::Uuid::new_v4()))
    }

    /// Wrap an existing id string (parsing signal tokens, wire messages, etc).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for AgentId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for AgentId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for AgentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
