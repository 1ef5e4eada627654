use crate::config::ConfigError;
use std::time::{Duration, Instant};

/// Tracks a monotone counter toward a fixed target and derives percentage,
/// elapsed time, and a linear estimate of the time remaining.
///
/// The remaining-time math is a pure function of the last recorded sample
/// (`remaining_for`), so the estimate does not drift between samples and the
/// derivation is testable without a clock.
#[derive(Debug, Clone)]
pub struct ProgressTimer {
    target: u64,
    current: u64,
    started: Instant,
    /// Elapsed time at the moment `current` was last observed.
    sampled_at: Duration,
}

impl ProgressTimer {
    /// A zero target would make every derivation meaningless, so it is
    /// rejected up front.
    pub fn new(target: u64) -> Result<Self, ConfigError> {
        if target == 0 {
            return Err(ConfigError::ZeroTarget);
        }
        Ok(Self {
            target,
            current: 0,
            started: Instant::now(),
            sampled_at: Duration::ZERO,
        })
    }

    /// Record a progress observation. The stored value never decreases: the
    /// worker publishes a monotone counter, so a regressing `v` can only be
    /// a caller bug and is clamped to the previous value.
    pub fn update_current_value(&mut self, v: u64) {
        self.current = self.current.max(v);
        self.sampled_at = self.started.elapsed();
    }

    pub fn current_value(&self) -> u64 {
        self.current
    }

    pub fn target_value(&self) -> u64 {
        self.target
    }

    /// Fraction of the target completed, as a percentage clamped to
    /// `[0.0, 100.0]`.
    pub fn percentage(&self) -> f64 {
        (self.current as f64 / self.target as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Wall time since construction.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Estimated time remaining, extrapolated from the last sample. `None`
    /// until the counter moves (no basis for an estimate), zero once the
    /// target is reached.
    pub fn remaining(&self) -> Option<Duration> {
        remaining_for(self.sampled_at, self.current, self.target)
    }
}

/// With `current` of `target` done after `elapsed`, the remainder takes
/// `elapsed * (target - current) / current`. Saturates instead of panicking
/// when the extrapolation overflows `Duration`.
fn remaining_for(elapsed: Duration, current: u64, target: u64) -> Option<Duration> {
    if current == 0 {
        return None;
    }
    if current >= target {
        return Some(Duration::ZERO);
    }
    let ratio = (target - current) as f64 / current as f64;
    let secs = elapsed.as_secs_f64() * ratio;
    Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
}
