use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The run-wide stop flag shared between the Generational Driver and any
/// operator that can decide to terminate the run, grounded on the teacher's
/// `EngineControl` (the pause/step-gate machinery is out of scope here since
/// spec section 4.6 only needs the stop signal, not interactive pause/step).
#[derive(Clone, Default)]
pub struct RunControl {
    stop: Arc<AtomicBool>,
}

impl RunControl {
    pub fn new() -> Self {
        RunControl {
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_is_visible_through_clones() {
        let control = RunControl::new();
        let other = control.clone();
        assert!(!other.is_stopped());
        control.stop();
        assert!(other.is_stopped());
    }
}
