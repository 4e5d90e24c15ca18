//! Routing between the real-time and background dispatchers.

use paramsync_core::Priority;

use crate::dispatcher::Dispatcher;
use crate::record::ChangeRecord;

/// Pair of dispatchers plus the hand-off between them.
///
/// A change scheduled on one lane is applied there, then forwarded to the
/// other lane so that lane's observers hear about it too. Shared between
/// the façade and the background worker through an `Arc`.
#[derive(Debug)]
pub struct Scheduler {
    realtime: Dispatcher,
    background: Dispatcher,
}

impl Scheduler {
    /// Creates both dispatchers with `capacity` pre-allocated slots each.
    pub fn new(capacity: usize) -> Self {
        Self {
            realtime: Dispatcher::new(Priority::Realtime, capacity),
            background: Dispatcher::new(Priority::Async, capacity),
        }
    }

    /// Dispatcher for `lane`.
    pub fn dispatcher(&self, lane: Priority) -> &Dispatcher {
        match lane {
            Priority::Realtime => &self.realtime,
            Priority::Async => &self.background,
        }
    }

    /// Queues `record` on its origin lane. Returns `false` if that lane
    /// has been killed.
    ///
    /// A real-time record also reserves its later slot on the background
    /// lane here, so the real-time drain can forward it without allocating.
    pub fn schedule(&self, record: ChangeRecord) -> bool {
        match record.origin() {
            Priority::Realtime => {
                self.background.reserve_forward();
                let accepted = self.realtime.enqueue(record);
                if !accepted {
                    self.background.release_forward();
                }
                accepted
            }
            Priority::Async => self.background.enqueue(record),
        }
    }

    /// Drains `lane`, forwarding applied records to the other lane.
    ///
    /// Returns the number of records delivered. Draining the real-time lane
    /// does not allocate.
    pub fn process(&self, lane: Priority) -> usize {
        // A killed lane drops the notify step; nothing else to do.
        match lane {
            Priority::Realtime => self.realtime.drain(|record| {
                self.background.enqueue_reserved(record);
            }),
            Priority::Async => self.background.drain(|record| {
                self.realtime.enqueue(record);
            }),
        }
    }

    /// Kills both lanes.
    pub fn kill(&self) {
        self.background.kill();
        self.realtime.kill();
    }

    /// Whether both lanes have been killed.
    pub fn is_killed(&self) -> bool {
        self.realtime.is_killed() && self.background.is_killed()
    }
}
