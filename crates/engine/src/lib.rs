// SPDX-License-Identifier: MIT

//! cairn-engine: the task queue, lifecycle store, capability table and
//! agent runner that drive one agentlet through prepare → generate →
//! execute → submit → review.

pub mod capability;
pub mod collaborators;
mod error;
pub mod lifecycle_store;
pub mod queue;
pub mod runner;

pub use capability::{CapabilityTable, ContentMatch};
pub use collaborators::{CodeGenerator, ExecutionOutcome, Executor, LlmCollaborator};
pub use error::EngineError;
pub use lifecycle_store::LifecycleStore;
pub use queue::{QueuedTask, TaskQueue};
pub use runner::{run_agent, RunOutcome};
