//! # Fauxwork
//!
//! A paced, randomized engine for printing convincing fake system activity.
//!
//! Fauxwork keeps a terminal looking busy for demos, streams, and
//! screenshots. Nothing real happens: every line is synthetic, and every
//! pause is artificial.
//!
//! ## Core Concepts
//!
//! - **Module**: a simulated workload (a kernel boot, a package build) that
//!   prints lines and pauses between them.
//! - **DelayPolicy**: the one place pauses are decided. It skips the first
//!   `instant_print_lines` pauses of a run and divides the rest by the speed
//!   factor.
//! - **RunContext**: what a module gets to work with: output, pacing, and a
//!   random source shared across the whole run.
//! - **Scheduler**: draws an enabled module at random, runs it to
//!   completion, and repeats until a time or module-count limit is reached or
//!   the run is cancelled.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fauxwork::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RunConfig {
//!         speed_factor: 2.0,
//!         exit_after_duration: Some(Duration::from_secs(30)),
//!         ..Default::default()
//!     };
//!
//!     let mut scheduler = Scheduler::new(all_modules(), config, sink_for_stdout())?;
//!
//!     let cancel = CancelToken::new();
//!     let on_ctrl_c = cancel.clone();
//!     tokio::spawn(async move {
//!         if tokio::signal::ctrl_c().await.is_ok() {
//!             on_ctrl_c.cancel();
//!         }
//!     });
//!
//!     let summary = scheduler.run(&cancel).await?;
//!     println!("{:?}", summary.reason);
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Fauxwork";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod common;
pub mod components;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod events;
pub mod modules;
pub mod output;
pub mod time;

/// A prelude module for easy importing of the most common Fauxwork types.
pub mod prelude {
    pub use crate::common::{CancelToken, ModuleId};
    pub use crate::components::module::Module;
    pub use crate::components::registry::ModuleRegistry;
    pub use crate::config::RunConfig;
    pub use crate::context::RunContext;
    pub use crate::engine::{Scheduler, SchedulerState};
    pub use crate::error::{FauxError, Result};
    pub use crate::events::{RunSummary, SchedulerEvent, StopReason};
    pub use crate::modules::all_modules;
    pub use crate::output::{sink_for_stdout, Color, MemorySink, OutputSink, PlainSink, TerminalSink};
    pub use crate::time::DelayPolicy;
}
