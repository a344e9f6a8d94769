// SPDX-License-Identifier: MIT

use thiserror::Error;

/// A 16 MiB cap on a single framed message, generous for a lifecycle
/// listing but small enough that a corrupt length prefix can't make the
/// daemon try to allocate gigabytes.
pub const MAX_MESSAGE_BYTES: u32 = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message of {0} bytes exceeds the {MAX_MESSAGE_BYTES} byte limit")]
    TooLarge(u32),
}
