//! Parameter collection whose changes are applied on a chosen thread.

use std::sync::Arc;

use paramsync_core::{
    ObserverRef, ParamError, ParamKind, Parameter, ParameterLookup, ParameterSet, Payload,
    Priority, Target,
};

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::record::ChangeRecord;
use crate::scheduler::Scheduler;
use crate::worker::BackgroundWorker;

/// A [`ParameterSet`] plus the machinery to change its values from any
/// thread.
///
/// Setters never apply a value directly. They queue a change for the lane
/// named by their `priority` argument:
///
/// - [`Priority::Realtime`]: applied when the real-time thread next calls
///   [`process_realtime_events`](Self::process_realtime_events).
/// - [`Priority::Async`]: applied by the background worker, which this set
///   owns.
///
/// Either way, observers of both priorities are notified on their own
/// thread, except the `sender` passed to the setter. Setters return `false`
/// when the change was dropped: unknown or read-only target, payload the
/// parameter cannot hold, or a set that is shutting down.
#[derive(Debug)]
pub struct ConcurrentParameterSet {
    parameters: ParameterSet,
    scheduler: Arc<Scheduler>,
    worker: BackgroundWorker,
}

impl ConcurrentParameterSet {
    /// Creates an empty set with the default configuration and starts its
    /// background worker.
    pub fn new() -> Result<Self, SchedulerError> {
        Self::with_config(&SchedulerConfig::default())
    }

    /// Creates an empty set and starts its background worker.
    pub fn with_config(config: &SchedulerConfig) -> Result<Self, SchedulerError> {
        let scheduler = Arc::new(Scheduler::new(config.queue_capacity));
        let worker = BackgroundWorker::spawn(Arc::clone(&scheduler), config)?;
        tracing::debug!(
            worker = %config.thread_name,
            queue_capacity = config.queue_capacity,
            "concurrent parameter set started"
        );
        Ok(Self {
            parameters: ParameterSet::new(),
            scheduler,
            worker,
        })
    }

    // ── Collection ──────────────────────────────────────────────────────────

    /// Adds a parameter and returns its shared handle.
    pub fn add(&mut self, parameter: Parameter) -> Result<Arc<Parameter>, ParamError> {
        self.parameters.add(parameter)
    }

    /// Looks up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Parameter>> {
        self.parameters.get(name)
    }

    /// Looks up a parameter by insertion index.
    pub fn get_index(&self, index: usize) -> Option<&Arc<Parameter>> {
        self.parameters.get_index(index)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the set holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// The underlying collection.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Shared scheduler, for driving a custom collection through the same
    /// lanes.
    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    // ── Setters ─────────────────────────────────────────────────────────────

    /// Queues a plain (unnormalized) value.
    pub fn set<'a>(
        &self,
        target: impl Into<Target<'a>>,
        value: f64,
        priority: Priority,
        sender: Option<&ObserverRef>,
    ) -> bool {
        self.schedule_scalar(target.into(), Payload::Plain(value), priority, sender)
    }

    /// Queues a boolean value.
    pub fn set_bool<'a>(
        &self,
        target: impl Into<Target<'a>>,
        value: bool,
        priority: Priority,
        sender: Option<&ObserverRef>,
    ) -> bool {
        self.schedule_scalar(target.into(), Payload::Boolean(value), priority, sender)
    }

    /// Queues a normalized value in \[0.0, 1.0\].
    pub fn set_scaled<'a>(
        &self,
        target: impl Into<Target<'a>>,
        normalized: f64,
        priority: Priority,
        sender: Option<&ObserverRef>,
    ) -> bool {
        self.schedule_scalar(target.into(), Payload::Normalized(normalized), priority, sender)
    }

    /// Queues a copy of `data` for a text or blob parameter.
    ///
    /// Dropped for scalar parameters, for empty buffers and, on text
    /// parameters, for bytes that are not valid UTF-8.
    pub fn set_data<'a>(
        &self,
        target: impl Into<Target<'a>>,
        data: &[u8],
        priority: Priority,
        sender: Option<&ObserverRef>,
    ) -> bool {
        let Some(parameter) = self.resolve_writable(target.into()) else {
            return false;
        };
        if !parameter.supports_data() {
            return false;
        }
        if parameter.kind() == ParamKind::Text && std::str::from_utf8(data).is_err() {
            return false;
        }
        let Some(payload) = Payload::data(data) else {
            return false;
        };
        self.scheduler
            .schedule(ChangeRecord::new(parameter, payload, priority, sender.cloned()))
    }

    /// Queues a string for a text or blob parameter.
    pub fn set_text<'a>(
        &self,
        target: impl Into<Target<'a>>,
        text: &str,
        priority: Priority,
        sender: Option<&ObserverRef>,
    ) -> bool {
        self.set_data(target, text.as_bytes(), priority, sender)
    }

    fn schedule_scalar(
        &self,
        target: Target<'_>,
        payload: Payload,
        priority: Priority,
        sender: Option<&ObserverRef>,
    ) -> bool {
        let Some(parameter) = self.resolve_writable(target) else {
            return false;
        };
        if parameter.supports_data() {
            return false;
        }
        self.scheduler
            .schedule(ChangeRecord::new(parameter, payload, priority, sender.cloned()))
    }

    fn resolve_writable(&self, target: Target<'_>) -> Option<Arc<Parameter>> {
        self.parameters
            .resolve(target)
            .filter(|parameter| !parameter.descriptor().is_read_only())
    }

    // ── Processing ──────────────────────────────────────────────────────────

    /// Applies queued real-time changes and delivers real-time notifications
    /// for changes the worker applied.
    ///
    /// Call once per processing cycle from the real-time thread only.
    /// Returns the number of records handled.
    pub fn process_realtime_events(&self) -> usize {
        self.scheduler.process(Priority::Realtime)
    }

    /// Records waiting for the next real-time drain.
    pub fn pending_realtime(&self) -> usize {
        self.scheduler.dispatcher(Priority::Realtime).pending()
    }

    /// Records waiting for the background worker.
    pub fn pending_async(&self) -> usize {
        self.scheduler.dispatcher(Priority::Async).pending()
    }

    /// Stops both lanes and joins the background worker.
    ///
    /// Later setters return `false`. Called automatically on drop.
    pub fn shutdown(&mut self) {
        if !self.scheduler.is_killed() {
            tracing::debug!(
                pending_realtime = self.pending_realtime(),
                pending_async = self.pending_async(),
                "concurrent parameter set shutting down"
            );
        }
        self.scheduler.kill();
        self.worker.shutdown();
    }
}

impl Drop for ConcurrentParameterSet {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramsync_core::{ParamDescriptor, ParamFlags};

    fn quiet_config() -> SchedulerConfig {
        SchedulerConfig::default().with_worker_nice(None)
    }

    #[test]
    fn targets_resolve_by_handle_index_and_name() {
        let mut set = ConcurrentParameterSet::with_config(&quiet_config()).unwrap();
        let p = set.add(Parameter::float("Mix", 0.0, 1.0, 0.0)).unwrap();

        assert!(set.set(&p, 0.1, Priority::Realtime, None));
        assert!(set.set(0_usize, 0.2, Priority::Realtime, None));
        assert!(set.set("mix", 0.3, Priority::Realtime, None));
        assert!(!set.set("missing", 0.4, Priority::Realtime, None));
        assert!(!set.set(5_usize, 0.4, Priority::Realtime, None));
        assert_eq!(set.pending_realtime(), 3);

        assert_eq!(set.process_realtime_events(), 3);
        assert_eq!(p.value(), 0.3);
    }

    #[test]
    fn scalar_setters_reject_data_parameters() {
        let mut set = ConcurrentParameterSet::with_config(&quiet_config()).unwrap();
        let blob = set.add(Parameter::blob("State")).unwrap();

        assert!(!set.set(&blob, 1.0, Priority::Realtime, None));
        assert!(!set.set_bool(&blob, true, Priority::Realtime, None));
        assert!(!set.set_scaled(&blob, 0.5, Priority::Realtime, None));
        assert_eq!(set.pending_realtime(), 0);
    }

    #[test]
    fn data_setters_validate_input() {
        let mut set = ConcurrentParameterSet::with_config(&quiet_config()).unwrap();
        let gain = set.add(Parameter::float("Gain", 0.0, 1.0, 0.5)).unwrap();
        let name = set.add(Parameter::text("Preset", "init")).unwrap();
        let state = set.add(Parameter::blob("State")).unwrap();

        assert!(!set.set_data(&gain, &[1, 2, 3, 4], Priority::Realtime, None));
        assert!(!set.set_data(&state, &[], Priority::Realtime, None));
        assert!(!set.set_data(&name, &[0xff, 0xfe], Priority::Realtime, None));
        assert_eq!(set.pending_realtime(), 0);

        assert!(set.set_text(&name, "warm pad", Priority::Realtime, None));
        assert!(set.set_data(&state, &[7, 8], Priority::Realtime, None));
        assert_eq!(set.process_realtime_events(), 2);
        assert_eq!(name.text_value(), "warm pad");
        assert_eq!(state.data().as_slice(), &[7, 8]);
        assert_eq!(gain.value(), 0.5);
    }

    #[test]
    fn read_only_parameters_refuse_changes() {
        let mut set = ConcurrentParameterSet::with_config(&quiet_config()).unwrap();
        let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::READ_ONLY);
        let meter = set
            .add(Parameter::new(
                ParamKind::Float,
                ParamDescriptor::new("Meter", 0.0, 1.0, 0.0).with_flags(flags),
            ))
            .unwrap();
        let label = set
            .add(Parameter::new(
                ParamKind::Text,
                ParamDescriptor::new("Label", 0.0, 1.0, 0.0).with_flags(flags),
            ))
            .unwrap();

        assert!(!set.set(&meter, 0.5, Priority::Realtime, None));
        assert!(!set.set_bool("meter", true, Priority::Async, None));
        assert!(!set.set_scaled(0_usize, 0.5, Priority::Realtime, None));
        assert!(!set.set_text(&label, "x", Priority::Realtime, None));
        assert_eq!(set.pending_realtime() + set.pending_async(), 0);
        assert_eq!(meter.value(), 0.0);
    }

    #[test]
    fn set_scaled_denormalizes() {
        let mut set = ConcurrentParameterSet::with_config(&quiet_config()).unwrap();
        let p = set.add(Parameter::float("Mix", 0.0, 100.0, 0.0)).unwrap();

        set.set_scaled(&p, 0.25, Priority::Realtime, None);
        set.process_realtime_events();
        assert_eq!(p.value(), 25.0);
    }

    #[test]
    fn setters_fail_after_shutdown() {
        let mut set = ConcurrentParameterSet::with_config(&quiet_config()).unwrap();
        let p = set.add(Parameter::boolean("Bypass", false)).unwrap();

        set.shutdown();
        set.shutdown();
        assert!(!set.set_bool(&p, true, Priority::Realtime, None));
        assert!(!set.set_bool(&p, true, Priority::Async, None));
        assert_eq!(set.process_realtime_events(), 0);
        assert!(!p.as_bool());
    }

    #[test]
    fn collection_accessors() {
        let mut set = ConcurrentParameterSet::with_config(&quiet_config()).unwrap();
        assert!(set.is_empty());
        let p = set.add(Parameter::integer("Voices", 1, 16, 8)).unwrap();

        assert_eq!(set.len(), 1);
        assert!(Arc::ptr_eq(set.get("voices").unwrap(), &p));
        assert!(Arc::ptr_eq(set.get_index(0).unwrap(), &p));
        assert_eq!(set.parameters().len(), 1);
        assert!(matches!(
            set.add(Parameter::integer("VOICES", 1, 4, 1)),
            Err(ParamError::DuplicateName { .. })
        ));
    }
}
