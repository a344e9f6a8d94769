// SPDX-License-Identifier: MIT

use cairn_core::CairnError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("overlay store error: {0}")]
    Store(#[from] cairn_overlay::StoreError),

    #[error("malformed lifecycle record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("lifecycle transition rejected: {0}")]
    Transition(#[from] cairn_core::LifecycleTransitionError),

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("invalid search regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("generator failed: {0}")]
    Generator(String),

    #[error("executor failed: {0}")]
    Executor(String),

    #[error("invalid: {0}")]
    Invalid(String),
}

impl From<EngineError> for CairnError {
    fn from(e: EngineError) -> Self {
        let detail = e.to_string();
        match e {
            EngineError::Store(inner) => inner.into(),
            EngineError::Json(_)
            | EngineError::Pattern(_)
            | EngineError::Regex(_)
            | EngineError::Transition(_)
            | EngineError::Invalid(_) => CairnError::invalid(detail),
            EngineError::Generator(_) | EngineError::Executor(_) => CairnError::external(detail),
        }
    }
}
