//! Per-lane dispatcher: owns one queue and delivers its records.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use paramsync_core::Priority;
use parking_lot::Mutex;

use crate::queue::EventQueue;
use crate::record::ChangeRecord;

/// Delivers queued changes on one lane (real-time or background).
///
/// Any thread may [`enqueue`](Self::enqueue); only the lane's own thread
/// should [`drain`](Self::drain). A second concurrent drainer is turned
/// away rather than blocked.
#[derive(Debug)]
pub struct Dispatcher {
    lane: Priority,
    queue: EventQueue,
    batch: Mutex<VecDeque<ChangeRecord>>,
}

impl Dispatcher {
    /// Creates a dispatcher for `lane` with `capacity` pre-allocated slots.
    pub fn new(lane: Priority, capacity: usize) -> Self {
        Self {
            lane,
            queue: EventQueue::with_capacity(capacity),
            batch: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Lane this dispatcher delivers on.
    pub fn lane(&self) -> Priority {
        self.lane
    }

    /// Queues a record for the next drain.
    ///
    /// The background lane also wakes its worker. Returns `false` (and
    /// drops the record) once the dispatcher has been killed.
    pub fn enqueue(&self, record: ChangeRecord) -> bool {
        let accepted = self.queue.push(record).is_ok();
        self.wake_if_background(accepted)
    }

    /// Sets aside room for one record that will later arrive through
    /// [`enqueue_reserved`](Self::enqueue_reserved).
    ///
    /// May allocate, so call it from the scheduling thread.
    pub fn reserve_forward(&self) {
        self.queue.reserve_slot();
    }

    /// Gives back a slot from [`reserve_forward`](Self::reserve_forward)
    /// whose record was never queued.
    pub fn release_forward(&self) {
        self.queue.release_slot();
    }

    /// Queues a record into a reserved slot without allocating.
    ///
    /// Used by the real-time drain to hand records to the background lane.
    pub fn enqueue_reserved(&self, record: ChangeRecord) -> bool {
        let accepted = self.queue.push_reserved(record).is_ok();
        self.wake_if_background(accepted)
    }

    fn wake_if_background(&self, accepted: bool) -> bool {
        if accepted && self.lane == Priority::Async {
            self.queue.notify();
        }
        accepted
    }

    /// Delivers every record queued before this call, in FIFO order.
    ///
    /// Records whose other lane still has work are passed to `forward`.
    /// Records enqueued while draining wait for the next drain. Returns the
    /// number of records delivered; `0` if killed or if another thread is
    /// already draining.
    ///
    /// Never waits on a lock held across a drain, so it is safe to call
    /// from the real-time thread.
    ///
    /// On the background lane a panicking observer is caught and logged;
    /// the rest of the batch is still delivered. On the real-time lane the
    /// panic reaches the caller.
    pub fn drain(&self, mut forward: impl FnMut(ChangeRecord)) -> usize {
        if self.queue.is_stopped() {
            return 0;
        }
        let Some(mut batch) = self.batch.try_lock() else {
            return 0;
        };
        self.queue.pop_all(&mut batch);

        let count = batch.len();
        for record in batch.drain(..) {
            let next = match self.lane {
                Priority::Realtime => record.deliver(self.lane),
                Priority::Async => deliver_isolated(record, self.lane),
            };
            if let Some(next) = next {
                forward(next);
            }
        }
        count
    }

    /// Blocks until work is queued or the dispatcher is killed.
    ///
    /// Returns `false` once killed.
    pub fn wait_for_work(&self) -> bool {
        self.queue.wait()
    }

    /// Stops accepting records and wakes any waiter.
    ///
    /// Returns `false` if already killed. Records still queued are
    /// dropped with the dispatcher.
    pub fn kill(&self) -> bool {
        let first = self.queue.request_stop();
        if first {
            tracing::debug!(lane = ?self.lane, pending = self.queue.len(), "dispatcher killed");
        }
        first
    }

    /// Whether [`kill`](Self::kill) has been called.
    pub fn is_killed(&self) -> bool {
        self.queue.is_stopped()
    }

    /// Number of records waiting for the next drain.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

fn deliver_isolated(record: ChangeRecord, lane: Priority) -> Option<ChangeRecord> {
    let target = Arc::clone(record.target());
    match panic::catch_unwind(AssertUnwindSafe(|| record.deliver(lane))) {
        Ok(next) => next,
        Err(payload) => {
            tracing::error!(
                parameter = target.name(),
                ?lane,
                reason = panic_message(payload.as_ref()),
                "observer panicked; change delivery abandoned"
            );
            None
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
