// SPDX-License-Identifier: MIT

//! Errors local to the overlay store, convertible into [`cairn_core::CairnError`].

use cairn_core::CairnError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),

    #[error("namespace already exists: {0}")]
    NamespaceAlreadyExists(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("path escapes namespace root: {0}")]
    InvalidPath(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<StoreError> for CairnError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NamespaceNotFound(_) | StoreError::FileNotFound(_) => {
                CairnError::not_found(e.to_string())
            }
            StoreError::NamespaceAlreadyExists(_) => CairnError::already_exists(e.to_string()),
            StoreError::InvalidPath(_) => CairnError::invalid(e.to_string()),
            StoreError::Sqlite(_) | StoreError::Io(_) | StoreError::Join(_) => {
                CairnError::Io(e.to_string())
            }
        }
    }
}
