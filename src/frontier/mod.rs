//! Frontier manager
//!
//! Owns the complete, never-reset set of scheduled-or-processed page
//! identities and the live work queue. The single atomic check-and-set in
//! [`Frontier::submit_if_new`] is the system's core correctness mechanism:
//! hub and collection pages frequently cross-link back to already-discovered
//! pages, and without it concurrent expansion would re-explore them without
//! bound.
//!
//! Draining blocks until an item is available or the frontier is permanently
//! closed: closed means no further top-level seeding will occur, the queue is
//! empty and no drained item is still in flight. Submissions from in-flight
//! workers remain valid after [`Frontier::close_when_idle`].

use crate::corpus::WorkItem;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use tokio::sync::Notify;

/// The work queue plus the scheduled-or-processed identity set
pub struct Frontier {
    inner: Mutex<Inner>,
    notify: Notify,
}

struct Inner {
    queue: VecDeque<WorkItem>,
    scheduled: HashSet<i64>,
    in_flight: usize,
    closed: bool,
}

impl Frontier {
    /// Creates an empty, open frontier
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::new(),
                scheduled: HashSet::new(),
                in_flight: 0,
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Pre-populates the scheduled-set, e.g. from a previous run's index
    ///
    /// Pre-seeded identities are never fetched: `submit_if_new` returns false
    /// for them immediately.
    pub fn preseed<I: IntoIterator<Item = i64>>(&self, page_ids: I) {
        let mut inner = self.inner.lock().unwrap();
        inner.scheduled.extend(page_ids);
    }

    /// Atomically schedules the item unless its page identity was ever seen
    ///
    /// Returns true when the item was enqueued, false when the identity was
    /// already scheduled or processed. Submission itself never fails; at most
    /// it is a no-op.
    pub fn submit_if_new(&self, item: WorkItem) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if !inner.scheduled.insert(item.page.page_id) {
            return false;
        }
        inner.queue.push_back(item);
        drop(inner);
        self.notify.notify_one();
        true
    }

    /// Marks an identity as terminally processed without enqueueing it
    ///
    /// Used for redirect targets resolved mid-flight. Returns true when the
    /// identity was newly marked, false when it was already known.
    pub fn mark_processed(&self, page_id: i64) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.scheduled.insert(page_id)
    }

    /// Blocking dequeue
    ///
    /// Suspends the caller until an item is available, or returns `None` once
    /// the frontier is closed, drained and idle. Each returned item must be
    /// balanced by one [`Frontier::task_done`] call.
    pub async fn drain(&self) -> Option<WorkItem> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before inspecting state, so a submission landing
            // between the check and the await still wakes us
            notified.as_mut().enable();

            {
                let mut inner = self.inner.lock().unwrap();
                if let Some(item) = inner.queue.pop_front() {
                    inner.in_flight += 1;
                    return Some(item);
                }
                if inner.closed && inner.in_flight == 0 {
                    drop(inner);
                    // Cascade the terminal signal to the other drainers
                    self.notify.notify_waiters();
                    return None;
                }
            }

            notified.as_mut().await;
        }
    }

    /// Reports completion (success or isolated failure) of a drained item
    pub fn task_done(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        let terminal = inner.closed && inner.in_flight == 0 && inner.queue.is_empty();
        drop(inner);
        if terminal {
            self.notify.notify_waiters();
        }
    }

    /// Signals that no further top-level seeding will occur
    pub fn close_when_idle(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.closed = true;
        drop(inner);
        self.notify.notify_waiters();
    }

    /// Number of items currently queued
    pub fn queue_len(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }

    /// Number of identities ever scheduled or processed
    pub fn scheduled_len(&self) -> usize {
        self.inner.lock().unwrap().scheduled.len()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}
