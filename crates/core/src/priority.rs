// SPDX-License-Identifier: MIT

//! Task queue admission priority.

use serde::{Deserialize, Serialize};

/// Admission priority for a queued task.
///
/// Declared low-to-high so the derived [`Ord`] matches queue precedence
/// directly: a [`std::collections::BinaryHeap`] of tasks pops the highest
/// priority (and, among equal priorities, the task enqueued first — see
/// `cairn_engine::queue`) without any custom comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Normal
    }
}

crate::simple_display! {
    Priority {
        Low => "low",
        Normal => "normal",
        High => "high",
        Urgent => "urgent",
    }
}

#[cfg(test)]
#[path = "priority_tests.rs"]
mod tests;
