//! Run supervision: one worker thread per run, a state machine published
//! through a shared atomic, and exactly-once artifact delivery at join.
//!
//! The controller and the worker share only scalars (state byte, interrupt
//! flag, progress counters). The job itself stays owned by the worker and
//! travels back through the thread's exit value, never through a channel.

use crate::control::InterruptController;
use crate::job::{Job, OutputSink, PassOutcome};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_COMPLETED: u8 = 2;
const STATE_FAULTED: u8 = 3;
const STATE_INTERRUPTED: u8 = 4;

/// Lifecycle of a supervised run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Faulted,
    Interrupted,
}

impl RunState {
    fn from_u8(raw: u8) -> RunState {
        match raw {
            STATE_RUNNING => RunState::Running,
            STATE_COMPLETED => RunState::Completed,
            STATE_FAULTED => RunState::Faulted,
            STATE_INTERRUPTED => RunState::Interrupted,
            _ => RunState::Idle,
        }
    }

    /// Completed, Faulted and Interrupted: the worker has wound down.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Faulted | RunState::Interrupted
        )
    }
}

/// How a joined run ended. Interruption is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Interrupted,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    /// Operation called in a state that does not allow it (`start` while
    /// not idle, `join` before `start` or after the run was consumed).
    #[error("{operation} is not valid while the runner is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: RunState,
    },
    /// The worker faulted: the job returned an error or panicked. The
    /// artifact sink was not invoked.
    #[error("worker fault")]
    Fault {
        #[source]
        source: anyhow::Error,
    },
    /// The artifact sink rejected the write.
    #[error("artifact sink write failed")]
    Sink {
        #[source]
        source: anyhow::Error,
    },
    /// The worker thread could not be spawned.
    #[error("failed to spawn worker thread")]
    Spawn(#[source] std::io::Error),
}

/// Scalars shared between the worker and observers. The state byte is the
/// cross-thread signal: a terminal value means the worker has wound down.
struct Shared {
    state: AtomicU8,
    units_completed: AtomicU64,
    passes_done: AtomicU64,
}

/// Worker exit payload, carried through the join handle.
enum WorkerExit<J> {
    Completed(J),
    Interrupted(J),
    Faulted(anyhow::Error),
}

/// A started run: the worker handle and the sink that will receive the
/// artifact. Stored together so neither can exist without the other.
struct RunHandle<J, S> {
    worker: JoinHandle<WorkerExit<J>>,
    sink: S,
}

/// Supervises one job at a time on a dedicated worker thread.
///
/// `Idle -> start -> Running -> {Completed, Faulted, Interrupted} -> join
/// -> Idle`; the runner is reusable after `join`. Dropping a runner with a
/// live run signals its interrupt flag and detaches the worker; the
/// artifact is lost.
pub struct JobRunner<J, S> {
    shared: Arc<Shared>,
    interrupt: InterruptController,
    run: Option<RunHandle<J, S>>,
}

impl<J, S> JobRunner<J, S>
where
    J: Job,
    S: OutputSink<J::Artifact>,
{
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: AtomicU8::new(STATE_IDLE),
                units_completed: AtomicU64::new(0),
                passes_done: AtomicU64::new(0),
            }),
            interrupt: InterruptController::new(),
            run: None,
        }
    }

    /// Launch the worker thread for `job`. Valid only while `Idle`.
    pub fn start(&mut self, job: J, sink: S) -> Result<(), RunnerError> {
        let state = self.state();
        if state != RunState::Idle {
            return Err(RunnerError::InvalidState {
                operation: "start",
                state,
            });
        }

        // fresh counters and a fresh one-way interrupt flag for this run
        self.shared
            .units_completed
            .store(job.units_completed(), Ordering::Relaxed);
        self.shared.passes_done.store(0, Ordering::Relaxed);
        self.interrupt = InterruptController::new();

        // Running must be published before the worker exists: a short job
        // could otherwise publish its terminal state first and have it
        // overwritten here.
        self.shared.state.store(STATE_RUNNING, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let interrupt = self.interrupt.clone();
        let spawned = std::thread::Builder::new()
            .name("passmon-worker".into())
            .spawn(move || worker_loop(job, shared, interrupt));
        let worker = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                self.shared.state.store(STATE_IDLE, Ordering::Release);
                return Err(RunnerError::Spawn(err));
            }
        };

        self.run = Some(RunHandle { worker, sink });
        tracing::debug!("worker started");
        Ok(())
    }

    pub fn state(&self) -> RunState {
        RunState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// True once the worker has published a terminal state. The thread may
    /// still be a few instructions from exiting; `join` waits for that.
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Fine-grained units completed, as last published by the worker.
    pub fn units_completed(&self) -> u64 {
        self.shared.units_completed.load(Ordering::Relaxed)
    }

    /// Passes executed so far in the current (or just-finished) run.
    pub fn passes_done(&self) -> u64 {
        self.shared.passes_done.load(Ordering::Relaxed)
    }

    /// Handle to this run's interrupt flag. A fresh flag is installed at
    /// every `start`, so handles from earlier runs are inert.
    pub fn interrupt_controller(&self) -> InterruptController {
        self.interrupt.clone()
    }

    /// Block until the worker thread has fully terminated, deliver the
    /// artifact, and reset to `Idle`.
    ///
    /// Job errors and worker panics surface here as [`RunnerError::Fault`]
    /// and the sink is not invoked; completed and interrupted runs invoke
    /// the sink exactly once. Either way the run is consumed: a second
    /// `join` without an intervening `start` is `InvalidState`.
    pub fn join(&mut self) -> Result<RunOutcome, RunnerError> {
        let Some(RunHandle { worker, mut sink }) = self.run.take() else {
            return Err(RunnerError::InvalidState {
                operation: "join",
                state: self.state(),
            });
        };

        let exit = worker.join();
        // the worker is gone; counters stay readable until the next start
        self.shared.state.store(STATE_IDLE, Ordering::Release);

        match exit {
            Ok(WorkerExit::Completed(job)) => {
                sink.write(job.into_artifact())
                    .map_err(|source| RunnerError::Sink { source })?;
                tracing::debug!("run completed, artifact delivered");
                Ok(RunOutcome::Completed)
            }
            Ok(WorkerExit::Interrupted(job)) => {
                sink.write(job.into_artifact())
                    .map_err(|source| RunnerError::Sink { source })?;
                tracing::debug!("run interrupted, partial artifact delivered");
                Ok(RunOutcome::Interrupted)
            }
            Ok(WorkerExit::Faulted(source)) => Err(RunnerError::Fault { source }),
            Err(payload) => Err(RunnerError::Fault {
                source: anyhow::anyhow!("worker panicked: {:?}", payload),
            }),
        }
    }
}

impl<J, S> Default for JobRunner<J, S>
where
    J: Job,
    S: OutputSink<J::Artifact>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<J, S> Drop for JobRunner<J, S> {
    fn drop(&mut self) {
        // a still-running worker would otherwise run detached to completion
        if self.run.is_some() {
            self.interrupt.signal_interrupt();
        }
    }
}

/// Body of the worker thread. Counters are republished after every pass;
/// the terminal state is published last (release), so an observer that saw
/// a terminal state also sees the final counters.
fn worker_loop<J: Job>(
    mut job: J,
    shared: Arc<Shared>,
    interrupt: InterruptController,
) -> WorkerExit<J> {
    let guard = StatePublishGuard { shared: &shared };

    loop {
        if interrupt.is_interrupted() {
            guard.publish(STATE_INTERRUPTED);
            tracing::debug!(
                passes = shared.passes_done.load(Ordering::Relaxed),
                "worker interrupted"
            );
            return WorkerExit::Interrupted(job);
        }
        match job.execute_pass() {
            Ok(outcome) => {
                shared.passes_done.fetch_add(1, Ordering::Relaxed);
                shared
                    .units_completed
                    .store(job.units_completed(), Ordering::Relaxed);
                if outcome == PassOutcome::Done {
                    guard.publish(STATE_COMPLETED);
                    return WorkerExit::Completed(job);
                }
            }
            Err(err) => {
                guard.publish(STATE_FAULTED);
                tracing::debug!("worker faulted: {err:#}");
                return WorkerExit::Faulted(err);
            }
        }
    }
}

/// Publishes `Faulted` if the worker unwinds before reaching a normal
/// terminal publication, so observers can never wait on a dead worker.
struct StatePublishGuard<'a> {
    shared: &'a Shared,
}

impl StatePublishGuard<'_> {
    fn publish(&self, state: u8) {
        self.shared.state.store(state, Ordering::Release);
    }
}

impl Drop for StatePublishGuard<'_> {
    fn drop(&mut self) {
        // only the unwind path still sees Running here
        let _ = self.shared.state.compare_exchange(
            STATE_RUNNING,
            STATE_FAULTED,
            Ordering::Release,
            Ordering::Relaxed,
        );
    }
}
