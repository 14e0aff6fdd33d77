//! The contract every simulated workload implements.

use crate::common::CancelToken;
use crate::context::RunContext;
use crate::error::Result;
use async_trait::async_trait;

/// A unit of simulated work.
///
/// A module is constructed once and may be run any number of times within
/// one process, so it must not carry mutable state between runs. All output
/// goes through `ctx`, and all waiting goes through [`RunContext::delay`],
/// which is also where cancellation is observed. A module that never calls
/// `delay` cannot be interrupted until it returns.
#[async_trait]
pub trait Module: Send + Sync {
    /// Unique name, compared case-insensitively.
    fn name(&self) -> &str;

    /// One-line description shown by `fauxwork list`.
    fn signature(&self) -> &str {
        ""
    }

    /// Runs the module to completion or until `cancel` fires.
    ///
    /// Returning [`FauxError::Cancelled`](crate::error::FauxError::Cancelled)
    /// ends the scheduler run quietly; any other error aborts it.
    async fn run(&self, ctx: &mut RunContext, cancel: &CancelToken) -> Result<()>;
}
