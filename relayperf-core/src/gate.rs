use std::sync::OnceLock;
use std::time::Duration;

use tokio::time::Instant;

/// Shared wall-clock deadline checked by every worker before starting a send.
///
/// The deadline is soft: a send already in flight when it passes is allowed
/// to complete, bounding worst-case overrun to one transport call per worker.
#[derive(Debug)]
pub struct DeadlineGate {
    duration: Duration,
    deadline: OnceLock<Instant>,
}

impl DeadlineGate {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: OnceLock::new(),
        }
    }

    pub fn start_at(&self, started: Instant) {
        let _ = self.deadline.set(started + self.duration);
    }

    pub fn start(&self) {
        self.start_at(Instant::now());
    }

    /// True while another send may begin. If the runner didn't explicitly set
    /// a start time, the deadline is lazily initialized from the first call.
    pub fn open(&self) -> bool {
        let now = Instant::now();
        if self.deadline.get().is_none() {
            self.start_at(now);
        }
        match self.deadline.get() {
            Some(deadline) => now < *deadline,
            None => true,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.get().copied()
    }
}
