//! Cooperative interruption: a one-way flag shared between the controller
//! and the worker.
//!
//! The controller (Ctrl-C handler, test harness) signals the flag; the
//! worker loop checks it between passes and winds down. An in-flight pass
//! always runs to completion, so interruption takes effect at the next
//! pass boundary. The flag cannot be cleared for the lifetime of a run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable handle to a run's interrupt flag; clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptController {
    flag: Arc<AtomicBool>,
}

impl InterruptController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cooperative interruption. Idempotent: repeat calls are no-ops.
    pub fn signal_interrupt(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once interruption has been requested. Checked by the worker at
    /// pass boundaries.
    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear() {
        let ctl = InterruptController::new();
        assert!(!ctl.is_interrupted());
    }

    #[test]
    fn signal_is_one_way_and_idempotent() {
        let ctl = InterruptController::new();
        ctl.signal_interrupt();
        assert!(ctl.is_interrupted());
        ctl.signal_interrupt();
        ctl.signal_interrupt();
        assert!(ctl.is_interrupted());
    }

    #[test]
    fn clones_share_the_flag() {
        let ctl = InterruptController::new();
        let seen_by_worker = ctl.clone();
        assert!(!seen_by_worker.is_interrupted());
        ctl.signal_interrupt();
        assert!(seen_by_worker.is_interrupted());
    }
}
