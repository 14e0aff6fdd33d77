//! Error types for the fauxwork engine.

use thiserror::Error;

/// Errors surfaced by the scheduler, the delay policy, and modules.
///
/// Cancellation travels through this type so that `?` carries it out of a
/// module's suspension points, but the scheduler turns it into
/// [`StopReason::Cancelled`](crate::events::StopReason) rather than an error.
#[derive(Debug, Error)]
pub enum FauxError {
    /// The scheduler was constructed with an empty module collection.
    #[error("no modules registered: there is nothing to schedule")]
    NoModules,

    /// The enabled-module filter matched nothing, most likely a typo.
    #[error("no modules enabled: none of [{requested}] matched a known module")]
    NoModulesEnabled { requested: String },

    /// `run` was called on a scheduler that has already run.
    #[error("scheduler has already stopped and cannot be resumed")]
    AlreadyStopped,

    /// A cooperative cancellation was observed at a suspension point.
    #[error("run cancelled")]
    Cancelled,

    /// A module raised a failure of its own.
    #[error("module '{module}' failed: {message}")]
    Module { module: String, message: String },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl FauxError {
    /// Creates a module failure.
    pub fn module(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Module {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for the cooperative cancellation outcome.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` for errors caused by configuration rather than a module.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::NoModules | Self::NoModulesEnabled { .. } | Self::Config(_)
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FauxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_not_config() {
        let err = FauxError::Cancelled;
        assert!(err.is_cancelled());
        assert!(!err.is_config());
    }

    #[test]
    fn test_no_modules_enabled_names_the_request() {
        let err = FauxError::NoModulesEnabled {
            requested: "nonexistent".to_string(),
        };
        assert!(err.is_config());
        assert!(err.to_string().contains("nonexistent"));
        assert!(err.to_string().starts_with("no modules enabled"));
    }

    #[test]
    fn test_module_error_carries_name() {
        let err = FauxError::module("cargo", "registry exploded");
        assert_eq!(err.to_string(), "module 'cargo' failed: registry exploded");
    }
}
