use std::time::{Duration, Instant};

use crate::config::DEFAULT_DEBOUNCE_MS;

/// Batches rapid keystrokes into a single dispatch
///
/// Each schedule restarts the delay; a dispatch is due once `delay` has
/// passed since the most recent schedule.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    /// Timestamp of the last input that triggered a debounce
    last_input_time: Option<Instant>,
    /// Whether there's a pending dispatch waiting for debounce to expire
    pending_execution: bool,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_input_time: None,
            pending_execution: false,
        }
    }

    pub fn schedule_execution(&mut self) {
        self.schedule_execution_at(Instant::now());
    }

    pub fn schedule_execution_at(&mut self, now: Instant) {
        self.last_input_time = Some(now);
        self.pending_execution = true;
    }

    pub fn should_execute(&self) -> bool {
        self.should_execute_at(Instant::now())
    }

    pub fn should_execute_at(&self, now: Instant) -> bool {
        if !self.pending_execution {
            return false;
        }

        match self.last_input_time {
            Some(last_time) => now.saturating_duration_since(last_time) >= self.delay,
            None => false,
        }
    }

    pub fn mark_executed(&mut self) {
        self.pending_execution = false;
        self.last_input_time = None;
    }

    /// Drops any pending dispatch
    pub fn cancel(&mut self) {
        self.mark_executed();
    }

    pub fn has_pending(&self) -> bool {
        self.pending_execution
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
#[path = "debouncer_tests.rs"]
mod debouncer_tests;
