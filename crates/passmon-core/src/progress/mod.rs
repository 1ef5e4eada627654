//! Progress telemetry primitives: throughput smoothing and target tracking.

mod rate;
mod timer;

pub use rate::RateEstimator;
pub use timer::ProgressTimer;
