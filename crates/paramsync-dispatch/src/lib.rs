//! Paramsync Dispatch - parameter changes handed safely between threads
//!
//! Any thread may request a parameter change; the change is applied on the
//! thread class it names and every observer hears about it on its own
//! thread class. The real-time side never blocks: it drains its queue once
//! per processing cycle and gives up immediately if the queue is contended.
//!
//! # Flow of one change
//!
//! 1. A setter on [`ConcurrentParameterSet`] builds a [`ChangeRecord`] and
//!    queues it on the real-time or the background lane.
//! 2. That lane's [`Dispatcher`] applies the value and notifies observers of
//!    the same priority, skipping the sender.
//! 3. The record moves to the other lane, which notifies its observers.
//!
//! The background lane is drained by a [`BackgroundWorker`] thread owned by
//! the set. The real-time lane is drained by whoever calls
//! [`ConcurrentParameterSet::process_realtime_events`].
//!
//! # Example
//!
//! ```rust
//! use paramsync_core::{Parameter, Priority};
//! use paramsync_dispatch::ConcurrentParameterSet;
//!
//! let mut params = ConcurrentParameterSet::new().unwrap();
//! let bypass = params.add(Parameter::boolean("Bypass", false)).unwrap();
//!
//! assert!(params.set_bool(&bypass, true, Priority::Realtime, None));
//! assert!(!bypass.as_bool());
//!
//! // Inside the audio callback:
//! params.process_realtime_events();
//! assert!(bypass.as_bool());
//! ```
//!
//! # Errors
//!
//! Only construction and configuration return errors ([`SchedulerError`]).
//! Scheduling reports a dropped change with `false`; draining and
//! notification never fail.

pub mod concurrent_set;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod queue;
pub mod record;
pub mod scheduler;
pub mod worker;

pub use concurrent_set::ConcurrentParameterSet;
pub use config::SchedulerConfig;
pub use dispatcher::Dispatcher;
pub use error::SchedulerError;
pub use queue::EventQueue;
pub use record::ChangeRecord;
pub use scheduler::Scheduler;
pub use worker::BackgroundWorker;
