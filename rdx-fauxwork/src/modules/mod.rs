//! Built-in simulated workloads.
//!
//! Each module only decides what text to print and how long to pause in
//! between; the pacing itself belongs to the engine.

pub mod bootlog;
pub mod cargo;
pub mod journal;

use crate::components::module::Module;
use std::sync::Arc;

pub use bootlog::Bootlog;
pub use cargo::Cargo;
pub use journal::Journal;

/// Every built-in module, in a stable order.
pub fn all_modules() -> Vec<Arc<dyn Module>> {
    vec![Arc::new(Bootlog), Arc::new(Cargo), Arc::new(Journal)]
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::RunConfig;
    use crate::context::RunContext;
    use crate::output::MemorySink;
    use std::sync::Arc;

    /// A seeded context that never waits.
    pub fn instant_context(sink: &MemorySink, seed: u64) -> RunContext {
        let config = RunConfig {
            seed: Some(seed),
            instant_print_lines: u64::MAX,
            ..Default::default()
        };
        RunContext::from_config(Arc::new(sink.clone()), &config)
    }
}
