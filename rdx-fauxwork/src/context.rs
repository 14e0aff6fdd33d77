//! The execution context handed to every module run.

use crate::common::CancelToken;
use crate::config::RunConfig;
use crate::error::Result;
use crate::output::{Color, OutputSink};
use crate::time::DelayPolicy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;

/// Everything a module may touch while it runs: output, pacing, randomness.
///
/// One context lives for a whole scheduler run. Modules never see the sink
/// or the delay policy directly, so the pacing rules cannot be bypassed, and
/// the random source is not reseeded between modules.
pub struct RunContext {
    sink: Arc<dyn OutputSink>,
    policy: DelayPolicy,
    rng: ChaCha8Rng,
}

impl RunContext {
    /// Creates a context with an explicit policy and random source.
    pub fn new(sink: Arc<dyn OutputSink>, policy: DelayPolicy, rng: ChaCha8Rng) -> Self {
        Self { sink, policy, rng }
    }

    /// Creates a context for `config`, seeding from `config.seed` when set
    /// and from OS entropy otherwise.
    pub fn from_config(sink: Arc<dyn OutputSink>, config: &RunConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(sink, DelayPolicy::from_config(config), rng)
    }

    pub fn write(&self, text: &str) {
        self.sink.write(text);
    }

    pub fn write_line(&self, text: &str) {
        self.sink.write_line(text);
    }

    pub fn write_styled(&self, text: &str, color: Option<Color>) {
        self.sink.write_styled(text, color);
    }

    /// Pauses for the paced equivalent of `base`. See [`DelayPolicy::delay`].
    pub async fn delay(&mut self, base: Duration, cancel: &CancelToken) -> Result<()> {
        self.policy.delay(base, cancel).await
    }

    /// The run's shared random source.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn terminal_width(&self) -> u16 {
        self.sink.terminal_width()
    }

    pub fn policy(&self) -> &DelayPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut DelayPolicy {
        &mut self.policy
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
