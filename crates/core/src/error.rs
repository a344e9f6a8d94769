// SPDX-License-Identifier: MIT

//! The error taxonomy shared by every Cairn crate.
//!
//! Each crate that needs richer context (a path, a namespace name, an I/O
//! source) defines its own `thiserror` enum and converts into
//! [`CairnError`] at its public boundary; this keeps `match`es on the
//! taxonomy exhaustive for callers (the orchestrator, the runner) that only
//! care about the category, while preserving detail for logs.

use thiserror::Error;

/// The seven error categories named in the orchestrator specification.
#[derive(Debug, Error)]
pub enum CairnError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid: {0}")]
    Invalid(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("resource limit exceeded: {0}")]
    Resource(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("external collaborator failed: {0}")]
    External(String),
}

pub type CairnResult<T> = Result<T, CairnError>;

impl CairnError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }

    pub fn already_exists(detail: impl Into<String>) -> Self {
        Self::AlreadyExists(detail.into())
    }

    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::Invalid(detail.into())
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::Timeout(detail.into())
    }

    pub fn resource(detail: impl Into<String>) -> Self {
        Self::Resource(detail.into())
    }

    pub fn external(detail: impl Into<String>) -> Self {
        Self::External(detail.into())
    }

    /// Whether this error should surface as a lifecycle `error` string
    /// rather than retried — matches §7's propagation policy: runners map
    /// every terminal error into REJECTED, so all categories qualify, but
    /// callers doing their own retry loop (accept/reject) check this first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Timeout(_))
    }
}

impl From<std::io::Error> for CairnError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
