// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("filesystem watch error: {0}")]
    Notify(#[from] notify::Error),

    #[error("overlay store error: {0}")]
    Store(#[from] cairn_overlay::StoreError),
}
