//! The scheduler that drives the whole fauxwork system.

use crate::common::CancelToken;
use crate::components::module::Module;
use crate::components::registry::ModuleRegistry;
use crate::config::RunConfig;
use crate::context::RunContext;
use crate::error::{FauxError, Result};
use crate::events::{RunSummary, SchedulerEvent, StopReason};
use crate::output::OutputSink;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, error, info, trace};

/// Lifecycle of a [`Scheduler`]. There is no way back from `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Owns the module set and runs randomly selected modules one at a time.
///
/// Each iteration checks the cancellation token and the exit conditions,
/// draws one enabled module uniformly at random (repeats allowed), and
/// awaits it to completion before the next draw. All modules of a run share
/// a single [`RunContext`], so pacing state and randomness carry over from
/// one module to the next.
pub struct Scheduler {
    registry: ModuleRegistry,
    config: Arc<RunConfig>,
    sink: Arc<dyn OutputSink>,
    state: SchedulerState,
    event_sender: broadcast::Sender<SchedulerEvent>,
}

impl Scheduler {
    /// Creates a scheduler. Fails with [`FauxError::NoModules`] if `modules`
    /// is empty.
    pub fn new(
        modules: Vec<Arc<dyn Module>>,
        config: RunConfig,
        sink: Arc<dyn OutputSink>,
    ) -> Result<Self> {
        const CHANNEL_CAPACITY: usize = 256;
        let (event_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Ok(Self {
            registry: ModuleRegistry::from_modules(modules)?,
            config: Arc::new(config),
            sink,
            state: SchedulerState::Idle,
            event_sender,
        })
    }

    /// Runs modules until an exit condition is met or `cancel` fires.
    ///
    /// Returns a [`RunSummary`] for both exit conditions and cancellation;
    /// check [`RunSummary::reason`] to tell them apart. A configuration
    /// problem is reported before any output, and a module failure is
    /// returned unchanged without retrying. A module that reports
    /// [`FauxError::Cancelled`] while `cancel` is still clear has failed.
    pub async fn run(&mut self, cancel: &CancelToken) -> Result<RunSummary> {
        if self.state != SchedulerState::Idle {
            return Err(FauxError::AlreadyStopped);
        }

        let enabled: Vec<Arc<dyn Module>> = self
            .registry
            .enabled(&self.config.enabled_modules)
            .into_iter()
            .filter_map(|id| self.registry.get(id).map(Arc::clone))
            .collect();
        if enabled.is_empty() {
            self.state = SchedulerState::Stopped;
            return Err(self.no_modules_enabled());
        }

        self.state = SchedulerState::Running;
        let enabled_names: Vec<String> = enabled.iter().map(|m| m.name().to_string()).collect();
        info!(
            "Scheduler starting at {}x speed with modules: {}",
            self.config.effective_speed(),
            enabled_names.join(", ")
        );
        self.event_sender
            .send(SchedulerEvent::RunStarted {
                enabled: enabled_names,
            })
            .ok();

        let mut ctx = RunContext::from_config(Arc::clone(&self.sink), &self.config);
        let started = Instant::now();
        let mut completed: u64 = 0;

        let reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if let Some(reason) = check_exit(&self.config, started.elapsed(), completed) {
                break reason;
            }

            let Some(module) = enabled.choose(ctx.rng()).map(Arc::clone) else {
                self.state = SchedulerState::Stopped;
                return Err(self.no_modules_enabled());
            };
            let name = module.name().to_string();
            let iteration = completed + 1;

            debug!("Running module '{}' (iteration {}).", name, iteration);
            self.event_sender
                .send(SchedulerEvent::ModuleStarted {
                    name: name.clone(),
                    iteration,
                })
                .ok();

            match module.run(&mut ctx, cancel).await {
                Ok(()) => {}
                Err(FauxError::Cancelled) if cancel.is_cancelled() => {
                    debug!("Module '{}' observed cancellation.", name);
                    break StopReason::Cancelled;
                }
                Err(e) => {
                    error!("Module '{}' failed: {}", name, e);
                    self.state = SchedulerState::Stopped;
                    return Err(e);
                }
            }

            completed += 1;
            trace!("Module '{}' finished; {} completed.", name, completed);
            self.event_sender
                .send(SchedulerEvent::ModuleFinished { name, iteration })
                .ok();
        };

        self.state = SchedulerState::Stopped;
        let summary = RunSummary {
            reason,
            modules_completed: completed,
            elapsed: started.elapsed(),
        };
        info!(
            "Scheduler stopped ({:?}) after {} modules in {:?}.",
            summary.reason, summary.modules_completed, summary.elapsed
        );
        self.event_sender
            .send(SchedulerEvent::RunStopped { summary })
            .ok();
        Ok(summary)
    }

    fn no_modules_enabled(&self) -> FauxError {
        FauxError::NoModulesEnabled {
            requested: self.config.normalized_enabled().join(", "),
        }
    }

    /// Subscribes to the [`SchedulerEvent`] stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.event_sender.subscribe()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }
}

/// Evaluates the exit conditions in order: elapsed time, then module count.
pub fn check_exit(config: &RunConfig, elapsed: Duration, completed: u64) -> Option<StopReason> {
    if let Some(limit) = config.exit_after_duration {
        if elapsed >= limit {
            return Some(StopReason::DurationElapsed);
        }
    }
    if let Some(limit) = config.exit_after_module_count {
        if completed >= limit {
            return Some(StopReason::ModuleCountReached);
        }
    }
    None
}
