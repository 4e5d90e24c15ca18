//! Observer callbacks and the thread classes they run on.

use std::sync::Arc;

use crate::Parameter;

/// Thread class a change is routed to, or an observer wants to be called on.
///
/// `Realtime` means the periodic processing thread that must never block;
/// `Async` means the low-priority background worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    /// The real-time processing thread.
    Realtime,
    /// The background (non-real-time) thread.
    #[default]
    Async,
}

impl Priority {
    /// The other thread class.
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            Priority::Realtime => Priority::Async,
            Priority::Async => Priority::Realtime,
        }
    }
}

/// Receives a callback after a parameter's value changed.
///
/// Observers with [`Priority::Realtime`] are called from the real-time
/// thread and must obey its rules: no blocking, no unbounded work.
pub trait ParameterObserver: Send + Sync {
    /// Which thread class should deliver this observer's callbacks.
    fn priority(&self) -> Priority {
        Priority::Async
    }

    /// Called once per applied change, after the new value is visible.
    fn on_parameter_updated(&self, parameter: &Parameter);
}

/// Shared observer handle as stored by parameters and carried by changes.
pub type ObserverRef = Arc<dyn ParameterObserver>;

/// Identity comparison of two observer handles.
///
/// Compares data pointers only; vtable pointers for the same object may differ
/// across codegen units.
#[inline]
pub fn same_observer(a: &ObserverRef, b: &ObserverRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
