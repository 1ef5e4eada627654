//! Seams between the runner and the work it supervises: the job executed on
//! the worker thread, and the sink that receives the job's artifact.

use anyhow::Result;

/// What a single executed pass tells the worker loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// More passes remain.
    Continue,
    /// The job finished with this pass.
    Done,
}

/// A pass-structured computation the runner can supervise.
///
/// The worker thread owns the job exclusively while it runs; progress
/// reaches observers through counters the runner republishes after each
/// pass, so implementations need no internal synchronization.
pub trait Job: Send + 'static {
    /// Value handed to the output sink when the run completes or is
    /// interrupted.
    type Artifact: Send + 'static;

    /// Fine-grained work target for a full run (bytes, samples, ...),
    /// fixed up front. Routinely exceeds 32 bits.
    fn total_units(&self) -> u64;

    /// Fine-grained units completed so far. Non-decreasing; advances at
    /// pass boundaries.
    fn units_completed(&self) -> u64;

    /// Number of passes a full run executes.
    fn total_passes(&self) -> u64;

    /// Run the next pass to completion. An `Err` faults the whole run.
    fn execute_pass(&mut self) -> Result<PassOutcome>;

    /// Final artifact; partial when the run was interrupted.
    fn into_artifact(self) -> Self::Artifact;
}

/// Consumer of a finished (or interrupted) job's artifact.
pub trait OutputSink<A>: Send + 'static {
    fn write(&mut self, artifact: A) -> Result<()>;
}
