// SPDX-License-Identifier: MIT

//! Bounded priority task queue. `enqueue` never blocks; `try_dequeue` gates
//! admission on `active_count < max_concurrent`, preferring the highest
//! priority and, within a priority, the earliest-enqueued task.

use cairn_core::Priority;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A task waiting for (or running under) admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTask {
    pub task_text: String,
    pub priority: Priority,
    pub source: Option<String>,
    seq: u64,
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first; for equal priority, the lower sequence
        // number (enqueued earlier) sorts "greater" so the max-heap pops
        // FIFO order within a priority band.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct TaskQueue {
    inner: parking_lot::Mutex<Inner>,
}

struct Inner {
    pending: BinaryHeap<QueuedTask>,
    active_count: usize,
    max_concurrent: usize,
    next_seq: u64,
}

impl TaskQueue {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            inner: parking_lot::Mutex::new(Inner {
                pending: BinaryHeap::new(),
                active_count: 0,
                max_concurrent,
                next_seq: 0,
            }),
        }
    }

    /// Enqueues a task. Never blocks and never fails: queue depth is
    /// unbounded, only concurrent execution is bounded.
    pub fn enqueue(&self, task_text: String, priority: Priority, source: Option<String>) {
        let mut inner = self.inner.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.pending.push(QueuedTask {
            task_text,
            priority,
            source,
            seq,
        });
    }

    /// Pops the next task if `active_count < max_concurrent`, incrementing
    /// `active_count`. Returns `None` when the queue is empty or the
    /// concurrency limit is already saturated.
    pub fn try_dequeue(&self) -> Option<QueuedTask> {
        let mut inner = self.inner.lock();
        if inner.active_count >= inner.max_concurrent {
            return None;
        }
        let task = inner.pending.pop()?;
        inner.active_count += 1;
        Some(task)
    }

    /// Releases one admission slot. Idempotent guard: never underflows
    /// below zero even if called more times than `try_dequeue` granted.
    pub fn mark_done(&self) {
        let mut inner = self.inner.lock();
        inner.active_count = inner.active_count.saturating_sub(1);
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().active_count
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn max_concurrent(&self) -> usize {
        self.inner.lock().max_concurrent
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
