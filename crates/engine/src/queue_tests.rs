// SPDX-License-Identifier: MIT

use super::*;
use cairn_core::Priority;

#[test]
fn dequeue_respects_max_concurrent() {
    let queue = TaskQueue::new(1);
    queue.enqueue("a".to_string(), Priority::Normal, None);
    queue.enqueue("b".to_string(), Priority::Normal, None);

    let first = queue.try_dequeue().unwrap();
    assert_eq!(first.task_text, "a");
    assert_eq!(queue.active_count(), 1);

    assert!(queue.try_dequeue().is_none());
    assert_eq!(queue.pending_count(), 1);
}

#[test]
fn mark_done_frees_a_slot() {
    let queue = TaskQueue::new(1);
    queue.enqueue("a".to_string(), Priority::Normal, None);
    queue.enqueue("b".to_string(), Priority::Normal, None);

    queue.try_dequeue().unwrap();
    queue.mark_done();
    let second = queue.try_dequeue().unwrap();
    assert_eq!(second.task_text, "b");
}

#[test]
fn mark_done_never_underflows() {
    let queue = TaskQueue::new(2);
    queue.mark_done();
    queue.mark_done();
    assert_eq!(queue.active_count(), 0);
}

#[test]
fn higher_priority_dequeues_first() {
    let queue = TaskQueue::new(10);
    queue.enqueue("low".to_string(), Priority::Low, None);
    queue.enqueue("urgent".to_string(), Priority::Urgent, None);
    queue.enqueue("normal".to_string(), Priority::Normal, None);

    assert_eq!(queue.try_dequeue().unwrap().task_text, "urgent");
    assert_eq!(queue.try_dequeue().unwrap().task_text, "normal");
    assert_eq!(queue.try_dequeue().unwrap().task_text, "low");
}

#[test]
fn equal_priority_dequeues_fifo() {
    let queue = TaskQueue::new(10);
    queue.enqueue("first".to_string(), Priority::Normal, None);
    queue.enqueue("second".to_string(), Priority::Normal, None);
    queue.enqueue("third".to_string(), Priority::Normal, None);

    assert_eq!(queue.try_dequeue().unwrap().task_text, "first");
    assert_eq!(queue.try_dequeue().unwrap().task_text, "second");
    assert_eq!(queue.try_dequeue().unwrap().task_text, "third");
}

#[test]
fn active_count_bounds_hold_across_churn() {
    let queue = TaskQueue::new(2);
    for i in 0..5 {
        queue.enqueue(format!("t{i}"), Priority::Normal, None);
    }
    let mut admitted = 0;
    for _ in 0..5 {
        if queue.try_dequeue().is_some() {
            admitted += 1;
        }
        assert!(queue.active_count() <= queue.max_concurrent());
        queue.mark_done();
        assert!(queue.active_count() <= queue.max_concurrent());
    }
    assert_eq!(admitted, 5);
}

#[test]
fn empty_queue_dequeues_none() {
    let queue = TaskQueue::new(4);
    assert!(queue.try_dequeue().is_none());
}
