use crate::config::{self, ConfigError};

/// Exponential moving average over a stream of throughput measurements.
///
/// The first accepted measurement initializes the average; each later one
/// moves it by `alpha * value + (1 - alpha) * average`. Non-finite values
/// are dropped without touching the state.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    alpha: f64,
    average: f64,
    initialized: bool,
}

impl RateEstimator {
    /// `alpha` must be finite and in `(0.0, 1.0]`. Smaller alphas smooth
    /// harder; `1.0` degrades to tracking the latest value.
    pub fn new(alpha: f64) -> Result<Self, ConfigError> {
        config::validate_alpha(alpha)?;
        Ok(Self {
            alpha,
            average: 0.0,
            initialized: false,
        })
    }

    /// Fold one measurement into the average. NaN and infinities are skipped.
    pub fn add_measurement(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if self.initialized {
            self.average = self.alpha * value + (1.0 - self.alpha) * self.average;
        } else {
            self.average = value;
            self.initialized = true;
        }
    }

    /// Current smoothed value; `0.0` until a measurement has been accepted.
    pub fn average(&self) -> f64 {
        self.average
    }

    /// True once at least one measurement has been accepted.
    pub fn has_measurement(&self) -> bool {
        self.initialized
    }
}
