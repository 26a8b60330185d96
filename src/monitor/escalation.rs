//! One-way switch from observe-only to observe-and-terminate enforcement
//!
//! Rather than a separate sleeping timer, the elapsed time since startup is
//! compared against the delay on every read. The first read past the
//! deadline latches the flag so it can never revert.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Escalation {
    started: Instant,
    delay: Duration,
    escalated: AtomicBool,
}

impl Escalation {
    /// Start the escalation clock now
    pub fn new(delay: Duration) -> Self {
        Self::starting_at(Instant::now(), delay)
    }

    pub fn starting_at(started: Instant, delay: Duration) -> Self {
        Self {
            started,
            delay,
            escalated: AtomicBool::new(delay.is_zero()),
        }
    }

    /// Current escalation state; once true, stays true
    pub fn is_active(&self) -> bool {
        self.is_active_at(Instant::now())
    }

    pub fn is_active_at(&self, now: Instant) -> bool {
        if self.escalated.load(Ordering::Acquire) {
            return true;
        }

        if now.saturating_duration_since(self.started) >= self.delay {
            self.escalated.store(true, Ordering::Release);
            return true;
        }

        false
    }

    /// Time left before escalation, zero once active
    pub fn remaining(&self) -> Duration {
        if self.escalated.load(Ordering::Acquire) {
            return Duration::ZERO;
        }
        self.delay.saturating_sub(self.started.elapsed())
    }
}
