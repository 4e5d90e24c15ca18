//! Scheduled parameter changes.

use std::fmt;
use std::sync::Arc;

use paramsync_core::{ObserverRef, Parameter, Payload, Priority};

/// One pending change: target, new value, origin lane and originator.
///
/// A record is delivered twice. The first delivery (on its origin lane)
/// applies the payload and notifies that lane's observers; the record is
/// then handed to the other lane, whose delivery only notifies. A record
/// is owned by exactly one queue or one draining thread at a time.
pub struct ChangeRecord {
    target: Arc<Parameter>,
    payload: Option<Payload>,
    origin: Priority,
    sender: Option<ObserverRef>,
    retired: Option<Arc<Vec<u8>>>,
}

impl ChangeRecord {
    /// Creates a record that will be applied on the `origin` lane.
    pub fn new(
        target: Arc<Parameter>,
        payload: Payload,
        origin: Priority,
        sender: Option<ObserverRef>,
    ) -> Self {
        Self {
            target,
            payload: Some(payload),
            origin,
            sender,
            retired: None,
        }
    }

    /// Parameter this change is for.
    pub fn target(&self) -> &Arc<Parameter> {
        &self.target
    }

    /// Lane the value is applied on.
    pub fn origin(&self) -> Priority {
        self.origin
    }

    /// Observer that requested the change; it is not notified.
    pub fn sender(&self) -> Option<&ObserverRef> {
        self.sender.as_ref()
    }

    /// Whether the payload has already been applied.
    pub fn is_applied(&self) -> bool {
        self.payload.is_none()
    }

    /// Runs this record's step for `lane`.
    ///
    /// Returns the record if the other lane still has to notify.
    pub(crate) fn deliver(mut self, lane: Priority) -> Option<Self> {
        match self.payload.take() {
            Some(payload) => {
                let displaced = self.target.apply(&payload);
                // Buffers displaced on the real-time lane travel with the
                // record and are released by the background worker.
                if lane == Priority::Realtime {
                    self.retired = displaced;
                }
                self.target.notify_observers(lane, self.sender.as_ref());
                Some(self)
            }
            None => {
                self.target.notify_observers(lane, self.sender.as_ref());
                None
            }
        }
    }
}

impl fmt::Debug for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeRecord")
            .field("target", &self.target.name())
            .field("payload", &self.payload)
            .field("origin", &self.origin)
            .field("has_sender", &self.sender.is_some())
            .field("retired", &self.retired.as_ref().map(|b| b.len()))
            .finish()
    }
}
