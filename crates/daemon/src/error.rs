// SPDX-License-Identifier: MIT

//! Orchestrator-local error type. Maps every collaborator's error into the
//! shared `§7` taxonomy at this crate's public boundary.

use cairn_core::CairnError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid: {0}")]
    Invalid(String),

    #[error(transparent)]
    Engine(#[from] cairn_engine::EngineError),

    #[error(transparent)]
    Store(#[from] cairn_overlay::StoreError),

    #[error(transparent)]
    Watch(#[from] cairn_watch::WatchError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<OrchestratorError> for CairnError {
    fn from(e: OrchestratorError) -> Self {
        match e {
            OrchestratorError::NotFound(d) => CairnError::not_found(d),
            OrchestratorError::Invalid(d) => CairnError::invalid(d),
            OrchestratorError::Engine(inner) => inner.into(),
            OrchestratorError::Store(inner) => inner.into(),
            OrchestratorError::Watch(inner) => CairnError::Io(inner.to_string()),
            OrchestratorError::Io(e) => CairnError::Io(e.to_string()),
        }
    }
}
