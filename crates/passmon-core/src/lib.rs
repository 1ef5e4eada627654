pub mod config;
pub mod logging;

// Supervision engine
pub mod control;
pub mod job;
pub mod progress;
pub mod report;
pub mod runner;
pub mod workload;
