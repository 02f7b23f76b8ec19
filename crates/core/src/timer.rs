//! Game clock
//!
//! A tick-driven stopwatch: callers feed elapsed milliseconds and the timer
//! converts them into whole elapsed seconds. A stopped timer ignores ticks, so
//! no increment can land after `stop()`.

use crate::types::SECOND_MS;

/// Session stopwatch counting whole seconds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameTimer {
    running: bool,
    elapsed_secs: u32,
    /// Milliseconds accumulated toward the next whole second
    carry_ms: u32,
}

impl GameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from zero, discarding any previous run
    pub fn start(&mut self) {
        self.stop();
        self.elapsed_secs = 0;
        self.carry_ms = 0;
        self.running = true;
    }

    /// Stop counting; the elapsed value is frozen. Returns whether it was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        self.carry_ms = 0;
        was_running
    }

    /// Stop and zero the clock
    pub fn reset(&mut self) {
        self.stop();
        self.elapsed_secs = 0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    /// Advance by `elapsed_ms`; returns the number of whole seconds added
    pub fn tick(&mut self, elapsed_ms: u32) -> u32 {
        if !self.running {
            return 0;
        }

        let total = self.carry_ms.saturating_add(elapsed_ms);
        let whole = total / SECOND_MS;
        self.carry_ms = total % SECOND_MS;
        self.elapsed_secs = self.elapsed_secs.saturating_add(whole);
        whole
    }
}
