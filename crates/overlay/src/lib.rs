// SPDX-License-Identifier: MIT

//! cairn-overlay: namespaced content store with read-fallthrough.
//!
//! A [`store::OverlayStore`] hosts any number of namespaces, each backed by
//! its own SQLite file under `<project>/.agentfs/<name>.db`. A namespace
//! optionally names a parent; reading a path absent from a namespace falls
//! through to its parent, and a per-namespace tombstone shadows whatever the
//! parent has without mutating it. See `§4.1` of the orchestrator spec for
//! the full operation contract.

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::OverlayStore;
