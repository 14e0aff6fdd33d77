//! Contains the building blocks the scheduler works with.
//!
//! This module defines the [`Module`](module::Module) contract that every
//! simulated workload implements, and the registry that holds a scheduler's
//! module set. The `Scheduler` draws from a registry on every iteration.

pub mod module;
pub mod registry;
