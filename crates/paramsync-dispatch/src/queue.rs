//! Multi-producer, single-consumer change queue with a wake-up signal.
//!
//! Producers push under a short mutex. The consumer takes the whole batch
//! at once by swapping the queue's storage with a pre-allocated scratch
//! buffer, so steady-state draining never allocates.
//!
//! A queue can also hold *headroom*: slots promised in advance to records
//! that another thread will push later with
//! [`push_reserved`](EventQueue::push_reserved). Headroom is allocated by
//! whoever reserves it, so the later push never grows the buffer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::record::ChangeRecord;

#[derive(Debug)]
struct Pending {
    events: VecDeque<ChangeRecord>,
    /// Spare slots owed to future `push_reserved` calls.
    headroom: usize,
}

/// FIFO of pending [`ChangeRecord`]s plus a condition for the waiting consumer.
#[derive(Debug)]
pub struct EventQueue {
    pending: Mutex<Pending>,
    ready: Condvar,
    stopped: AtomicBool,
}

impl EventQueue {
    /// Creates a queue with room for `capacity` records before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(Pending {
                events: VecDeque::with_capacity(capacity),
                headroom: 0,
            }),
            ready: Condvar::new(),
            stopped: AtomicBool::new(false),
        }
    }

    /// Appends a record, growing the buffer if needed.
    ///
    /// Hands the record back if the queue has been stopped.
    pub fn push(&self, record: ChangeRecord) -> Result<(), ChangeRecord> {
        let mut pending = self.pending.lock();
        if self.is_stopped() {
            return Err(record);
        }
        let needed = pending.headroom + 1;
        pending.events.reserve(needed);
        pending.events.push_back(record);
        Ok(())
    }

    /// Sets aside one slot for a later [`push_reserved`](Self::push_reserved).
    ///
    /// May allocate; call it from the thread that creates the record.
    pub fn reserve_slot(&self) {
        let mut pending = self.pending.lock();
        pending.headroom += 1;
        let headroom = pending.headroom;
        pending.events.reserve(headroom);
    }

    /// Returns a slot reserved for a record that will never be pushed.
    pub fn release_slot(&self) {
        let mut pending = self.pending.lock();
        pending.headroom = pending.headroom.saturating_sub(1);
    }

    /// Appends a record into a slot set aside by
    /// [`reserve_slot`](Self::reserve_slot). Does not allocate.
    ///
    /// Hands the record back if the queue has been stopped.
    pub fn push_reserved(&self, record: ChangeRecord) -> Result<(), ChangeRecord> {
        let mut pending = self.pending.lock();
        if self.is_stopped() {
            return Err(record);
        }
        debug_assert!(pending.events.len() < pending.events.capacity());
        pending.headroom = pending.headroom.saturating_sub(1);
        pending.events.push_back(record);
        Ok(())
    }

    /// Moves every queued record into the empty `batch`, in FIFO order.
    ///
    /// The two buffers are swapped, so the queue keeps the batch's spare
    /// capacity for the next producers. Outstanding headroom is restored on
    /// the swapped-in buffer; without headroom this never allocates.
    pub fn pop_all(&self, batch: &mut VecDeque<ChangeRecord>) {
        debug_assert!(batch.is_empty());
        let mut pending = self.pending.lock();
        std::mem::swap(&mut pending.events, batch);
        let headroom = pending.headroom;
        if headroom > 0 {
            pending.events.reserve(headroom);
        }
    }

    /// Wakes the waiting consumer, if any.
    pub fn notify(&self) {
        self.ready.notify_one();
    }

    /// Blocks until the queue is non-empty or stopped.
    ///
    /// Returns `false` once the queue has been stopped.
    pub fn wait(&self) -> bool {
        let mut pending = self.pending.lock();
        while pending.events.is_empty() && !self.is_stopped() {
            self.ready.wait(&mut pending);
        }
        !self.is_stopped()
    }

    /// Stops the queue and wakes every waiter.
    ///
    /// Returns `false` if the queue was already stopped.
    pub fn request_stop(&self) -> bool {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return false;
        }
        // A waiter is either before its predicate check (and will see the
        // flag) or parked in `wait` (and will get the notification).
        drop(self.pending.lock());
        self.ready.notify_all();
        true
    }

    /// Whether [`request_stop`](Self::request_stop) has been called.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Number of queued records.
    pub fn len(&self) -> usize {
        self.pending.lock().events.len()
    }

    /// Whether no records are queued.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().events.is_empty()
    }

    /// Spare slots currently owed to reserved pushes.
    pub fn headroom(&self) -> usize {
        self.pending.lock().headroom
    }

    /// Current buffer capacity.
    pub fn capacity(&self) -> usize {
        self.pending.lock().events.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramsync_core::{Parameter, Payload, Priority};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn record(p: &Arc<Parameter>, value: f64) -> ChangeRecord {
        ChangeRecord::new(Arc::clone(p), Payload::Plain(value), Priority::Async, None)
    }

    #[test]
    fn pop_all_preserves_order_and_empties() {
        let p = Arc::new(Parameter::float("Mix", 0.0, 10.0, 0.0));
        let queue = EventQueue::with_capacity(4);
        for i in 0..6 {
            queue.push(record(&p, f64::from(i))).unwrap();
        }
        assert_eq!(queue.len(), 6);

        let mut batch = VecDeque::with_capacity(4);
        queue.pop_all(&mut batch);
        assert!(queue.is_empty());

        for (i, record) in batch.drain(..).enumerate() {
            record.deliver(Priority::Async);
            assert_eq!(p.value(), i as f64);
        }
    }

    #[test]
    fn reserved_slots_survive_swaps_and_pushes() {
        let p = Arc::new(Parameter::float("Mix", 0.0, 10.0, 0.0));
        let queue = EventQueue::with_capacity(2);
        for _ in 0..10 {
            queue.reserve_slot();
        }
        assert_eq!(queue.headroom(), 10);
        assert!(queue.capacity() >= 10);

        // Unreserved pushes keep the promised headroom free.
        queue.push(record(&p, 1.0)).unwrap();
        assert!(queue.capacity() >= queue.len() + 10);

        // So does the buffer swapped in by the consumer.
        let mut batch = VecDeque::new();
        queue.pop_all(&mut batch);
        assert_eq!(batch.len(), 1);
        assert!(queue.capacity() >= 10);

        let capacity = queue.capacity();
        for i in 0..10 {
            queue.push_reserved(record(&p, f64::from(i))).unwrap();
        }
        assert_eq!(queue.capacity(), capacity);
        assert_eq!(queue.headroom(), 0);
        assert_eq!(queue.len(), 10);
    }

    #[test]
    fn release_slot_saturates() {
        let queue = EventQueue::with_capacity(1);
        queue.reserve_slot();
        queue.release_slot();
        queue.release_slot();
        assert_eq!(queue.headroom(), 0);
    }

    #[test]
    fn stopped_queue_rejects_push() {
        let p = Arc::new(Parameter::float("Mix", 0.0, 1.0, 0.0));
        let queue = EventQueue::with_capacity(1);

        assert!(queue.request_stop());
        assert!(!queue.request_stop());
        assert!(queue.is_stopped());

        let rejected = queue.push(record(&p, 0.5)).unwrap_err();
        assert_eq!(rejected.target().name(), "Mix");
        assert!(queue.is_empty());
    }

    #[test]
    fn wait_returns_when_work_arrives() {
        let p = Arc::new(Parameter::float("Mix", 0.0, 1.0, 0.0));
        let queue = Arc::new(EventQueue::with_capacity(1));

        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.wait())
        };
        thread::sleep(Duration::from_millis(10));
        queue.push(record(&p, 0.5)).unwrap();
        queue.notify();

        assert!(waiter.join().unwrap());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn wait_returns_false_after_stop() {
        let queue = Arc::new(EventQueue::with_capacity(1));

        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.wait())
        };
        thread::sleep(Duration::from_millis(10));
        queue.request_stop();

        assert!(!waiter.join().unwrap());
        // Already stopped: returns immediately.
        assert!(!queue.wait());
    }
}
