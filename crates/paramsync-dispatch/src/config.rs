//! Scheduler configuration.
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! thread_name = "synth-params"
//! queue_capacity = 512
//! lower_worker_priority = true
//! worker_nice = 10
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// Settings for a [`ConcurrentParameterSet`](crate::ConcurrentParameterSet)
/// and its background worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Name given to the background worker thread.
    pub thread_name: String,
    /// Records pre-allocated per queue. Bursts beyond this grow the queue.
    pub queue_capacity: usize,
    /// Whether the worker lowers its own scheduling priority on start.
    pub lower_worker_priority: bool,
    /// Nice value applied when lowering priority (Linux), clamped to 1..=19.
    pub worker_nice: i32,
}

impl SchedulerConfig {
    /// Default worker thread name.
    pub const DEFAULT_THREAD_NAME: &'static str = "paramsync-scheduler";
    /// Default per-queue capacity.
    pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
    /// Default nice value for the worker.
    pub const DEFAULT_WORKER_NICE: i32 = 10;

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, SchedulerError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchedulerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| SchedulerError::read_config(path, source))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded scheduler config");
        Ok(config)
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String, SchedulerError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Sets the worker thread name.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Sets the per-queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Enables (`Some(nice)`) or disables (`None`) worker priority lowering.
    pub fn with_worker_nice(mut self, nice: Option<i32>) -> Self {
        match nice {
            Some(nice) => {
                self.lower_worker_priority = true;
                self.worker_nice = nice;
            }
            None => self.lower_worker_priority = false,
        }
        self
    }

    /// Nice value the worker should apply, if any.
    pub fn effective_nice(&self) -> Option<i32> {
        self.lower_worker_priority
            .then_some(self.worker_nice.clamp(1, 19))
    }

    /// Checks settings that would otherwise fail at thread spawn.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.thread_name.is_empty() || self.thread_name.contains('\0') {
            return Err(SchedulerError::InvalidThreadName(self.thread_name.clone()));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            thread_name: Self::DEFAULT_THREAD_NAME.to_string(),
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            lower_worker_priority: true,
            worker_nice: Self::DEFAULT_WORKER_NICE,
        }
    }
}
