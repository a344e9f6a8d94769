// SPDX-License-Identifier: MIT

//! cairn-watch: mirrors project filesystem changes into the stable
//! namespace, materialises an agent's effective view to disk for preview,
//! and polls for accept/reject signal tokens.

mod error;
pub mod file_watcher;
pub mod materializer;
pub mod signal_watcher;

pub use error::WatchError;
pub use file_watcher::{FileWatcher, FileWatcherConfig};
pub use materializer::Materializer;
pub use signal_watcher::{sweep_stale_dir, Signal, SignalSink, SignalWatcher, SignalWatcherConfig};
