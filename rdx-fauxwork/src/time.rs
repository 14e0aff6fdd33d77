//! The delay policy: the single point of pacing shared by every module.
//!
//! Modules ask for a "base" pause; the policy decides what is actually
//! applied. The first `instant_print_lines` requests of a run return at once
//! so the screen fills quickly, and every later request is divided by the
//! speed factor.

use crate::common::CancelToken;
use crate::config::RunConfig;
use crate::error::{FauxError, Result};
use std::time::Duration;
use tracing::trace;

/// Translates requested pauses into applied pauses for one scheduler run.
///
/// The instant-print counter is owned here, never in global state, so two
/// runs in the same process do not interfere.
#[derive(Debug, Clone)]
pub struct DelayPolicy {
    speed_factor: f64,
    instant_print_lines: u64,
    lines_printed_instantly: u64,
}

impl DelayPolicy {
    /// Creates a policy with the given speed factor and instant-print budget.
    pub fn new(speed_factor: f64, instant_print_lines: u64) -> Self {
        Self {
            speed_factor,
            instant_print_lines,
            lines_printed_instantly: 0,
        }
    }

    /// Creates a policy from a run configuration, with the speed factor
    /// clamped by [`RunConfig::effective_speed`].
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.effective_speed(), config.instant_print_lines)
    }

    /// Returns the pause applied for `base` once the instant-print budget is
    /// spent.
    ///
    /// A non-positive or NaN speed factor leaves `base` unscaled. A factor so
    /// small that the quotient overflows saturates at [`Duration::MAX`].
    pub fn scaled(&self, base: Duration) -> Duration {
        let factor = self.speed_factor;
        if factor.is_nan() || factor <= 0.0 {
            return base;
        }
        Duration::try_from_secs_f64(base.as_secs_f64() / factor).unwrap_or(Duration::MAX)
    }

    /// Waits for the applied equivalent of `base`, or until `cancel` fires.
    ///
    /// Returns [`FauxError::Cancelled`] when the wait is cut short, so modules
    /// can bail out with `?`.
    pub async fn delay(&mut self, base: Duration, cancel: &CancelToken) -> Result<()> {
        if self.lines_printed_instantly < self.instant_print_lines {
            self.lines_printed_instantly += 1;
            return Ok(());
        }

        let scaled = self.scaled(base);
        if scaled.is_zero() {
            return Ok(());
        }

        trace!("Delaying {:?} (requested {:?}).", scaled, base);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FauxError::Cancelled),
            _ = tokio::time::sleep(scaled) => Ok(()),
        }
    }

    /// Clears the instant-print counter so the policy can be reused.
    pub fn reset(&mut self) {
        self.lines_printed_instantly = 0;
    }

    /// How many delay requests have been skipped so far.
    pub fn lines_printed_instantly(&self) -> u64 {
        self.lines_printed_instantly
    }

    /// The divisor applied to every requested pause.
    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    /// How many leading requests are skipped before scaling starts.
    pub fn instant_print_lines(&self) -> u64 {
        self.instant_print_lines
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self::new(1.0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    const BASE: Duration = Duration::from_millis(200);

    /// Paused-clock sleeps land on the next millisecond tick.
    fn assert_waited(elapsed: Duration, expected: Duration) {
        assert!(
            elapsed >= expected && elapsed <= expected + Duration::from_millis(2),
            "waited {elapsed:?}, expected about {expected:?}"
        );
    }

    #[test]
    fn test_scaled_divides_by_speed() {
        assert_eq!(DelayPolicy::new(2.0, 0).scaled(BASE), Duration::from_millis(100));
        assert_eq!(DelayPolicy::new(0.5, 0).scaled(BASE), Duration::from_millis(400));
    }

    #[test]
    fn test_scaled_falls_back_for_non_positive_speed() {
        assert_eq!(DelayPolicy::new(0.0, 0).scaled(BASE), BASE);
        assert_eq!(DelayPolicy::new(-4.0, 0).scaled(BASE), BASE);
        assert_eq!(DelayPolicy::new(f64::NAN, 0).scaled(BASE), BASE);
    }

    #[test]
    fn test_scaled_saturates_and_floors() {
        assert_eq!(DelayPolicy::new(1e-300, 0).scaled(BASE), Duration::MAX);
        assert_eq!(DelayPolicy::new(f64::INFINITY, 0).scaled(BASE), Duration::ZERO);
        assert_eq!(DelayPolicy::new(3.0, 0).scaled(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_from_config_clamps_speed() {
        for (speed, expected) in [(3.0, 3.0), (0.0, 1.0), (-2.0, 1.0), (f64::INFINITY, 1.0)] {
            let config = RunConfig {
                speed_factor: speed,
                instant_print_lines: 4,
                ..Default::default()
            };
            let policy = DelayPolicy::from_config(&config);
            assert_eq!(policy.speed_factor(), expected, "factor {speed}");
            assert_eq!(policy.instant_print_lines(), 4);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_instant_lines_then_scaled() {
        let cancel = CancelToken::new();
        let mut policy = DelayPolicy::new(2.0, 3);

        for expected in 1..=3 {
            let start = Instant::now();
            policy.delay(Duration::from_secs(60), &cancel).await.unwrap();
            assert_eq!(start.elapsed(), Duration::ZERO);
            assert_eq!(policy.lines_printed_instantly(), expected);
        }

        let start = Instant::now();
        policy.delay(BASE, &cancel).await.unwrap();
        assert_waited(start.elapsed(), Duration::from_millis(100));
        assert_eq!(policy.lines_printed_instantly(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_base_returns_immediately() {
        let cancel = CancelToken::new();
        let mut policy = DelayPolicy::new(1.0, 0);
        let start = Instant::now();
        policy.delay(Duration::ZERO, &cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unscaled_for_non_positive_speed() {
        let cancel = CancelToken::new();
        let mut policy = DelayPolicy::new(0.0, 0);
        let start = Instant::now();
        policy.delay(BASE, &cancel).await.unwrap();
        assert_waited(start.elapsed(), BASE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_wait() {
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let mut policy = DelayPolicy::new(1.0, 0);
        let start = Instant::now();
        let err = policy.delay(Duration::from_secs(10), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restores_instant_budget() {
        let cancel = CancelToken::new();
        let mut policy = DelayPolicy::new(1.0, 1);
        policy.delay(BASE, &cancel).await.unwrap();
        assert_eq!(policy.lines_printed_instantly(), 1);

        policy.reset();
        assert_eq!(policy.lines_printed_instantly(), 0);
        let start = Instant::now();
        policy.delay(BASE, &cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
