//! Background worker thread that drains the async lane.
//!
//! The worker sleeps on the background dispatcher's queue, wakes on every
//! enqueue, and drains until it is killed. It optionally lowers its own
//! scheduling priority so it never competes with the real-time thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use paramsync_core::Priority;

use crate::config::SchedulerConfig;
use crate::dispatcher::Dispatcher;
use crate::error::SchedulerError;
use crate::scheduler::Scheduler;

/// Owns the background thread. Dropping it stops and joins the thread.
pub struct BackgroundWorker {
    scheduler: Arc<Scheduler>,
    name: String,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundWorker {
    /// Starts the worker thread for `scheduler`.
    pub fn spawn(scheduler: Arc<Scheduler>, config: &SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;

        let thread_scheduler = Arc::clone(&scheduler);
        let nice = config.effective_nice();
        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || run(&thread_scheduler, nice))
            .map_err(SchedulerError::SpawnWorker)?;

        Ok(Self {
            scheduler,
            name: config.thread_name.clone(),
            handle: Some(handle),
        })
    }

    /// Thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the thread is still alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Kills the background lane and joins the thread.
    ///
    /// A drain already in progress finishes first. Safe to call twice.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.scheduler.dispatcher(Priority::Async).kill();
        if handle.join().is_err() {
            tracing::error!(worker = %self.name, "background worker panicked");
        }
    }
}

impl Drop for BackgroundWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for BackgroundWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundWorker")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

fn run(scheduler: &Scheduler, nice: Option<i32>) {
    if let Some(nice) = nice {
        lower_current_thread_priority(nice);
    }
    tracing::info!("background worker started");

    let background = scheduler.dispatcher(Priority::Async);
    let _kill_on_exit = KillOnExit(background);
    let mut delivered: u64 = 0;
    while background.wait_for_work() {
        delivered += scheduler.process(Priority::Async) as u64;
    }

    tracing::info!(delivered, "background worker stopped");
}

/// Kills the background lane when the worker loop ends for any reason,
/// so later async changes are refused instead of queued for nobody.
struct KillOnExit<'a>(&'a Dispatcher);

impl Drop for KillOnExit<'_> {
    fn drop(&mut self) {
        if self.0.kill() {
            tracing::error!("background worker exited unexpectedly; async lane closed");
        }
    }
}

#[cfg(target_os = "linux")]
fn lower_current_thread_priority(nice: i32) {
    // On Linux, PRIO_PROCESS with id 0 addresses the calling thread.
    // SAFETY: setpriority takes no pointers and only affects this thread.
    #[allow(unsafe_code)]
    let result = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, nice) };
    if result == 0 {
        tracing::debug!(nice, "lowered background worker priority");
    } else {
        tracing::warn!(
            nice,
            error = %std::io::Error::last_os_error(),
            "could not lower background worker priority"
        );
    }
}

#[cfg(not(target_os = "linux"))]
fn lower_current_thread_priority(nice: i32) {
    tracing::debug!(nice, "worker priority adjustment not supported on this platform");
}
