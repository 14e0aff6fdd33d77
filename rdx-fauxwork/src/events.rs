//! Defines the event types broadcast by the scheduler.
//!
//! Observers subscribe with
//! [`Scheduler::subscribe_events`](crate::engine::Scheduler::subscribe_events).
//! Events are informational only; a run behaves the same whether or not
//! anyone is listening.

use std::time::Duration;

/// Why a scheduler run ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The external cancellation token fired.
    Cancelled,
    /// `exit_after_duration` elapsed.
    DurationElapsed,
    /// `exit_after_module_count` modules completed.
    ModuleCountReached,
}

/// Final statistics of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub reason: StopReason,
    pub modules_completed: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn was_cancelled(&self) -> bool {
        self.reason == StopReason::Cancelled
    }
}

/// Lifecycle events of a scheduler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Fired once the enabled subset has been computed.
    RunStarted { enabled: Vec<String> },
    /// Fired right before a module's `run` is awaited.
    ModuleStarted { name: String, iteration: u64 },
    /// Fired after a module returned successfully.
    ModuleFinished { name: String, iteration: u64 },
    /// Fired once when the run stops without an error.
    RunStopped { summary: RunSummary },
}
