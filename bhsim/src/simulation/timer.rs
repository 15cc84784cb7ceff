//! Wall-clock timer for a whole run

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
    end: Option<Instant>,
}

impl Timer {
    /// Started timer
    pub fn start() -> Self {
        Self { start: Instant::now(), end: None }
    }

    /// Freeze the end time and return the elapsed duration.
    /// Calling it again keeps the first end time.
    pub fn stop(&mut self) -> Duration {
        let end = *self.end.get_or_insert_with(Instant::now);
        end - self.start
    }

    /// Time since start, up to the stop time if stopped
    pub fn elapsed(&self) -> Duration {
        self.end.unwrap_or_else(Instant::now) - self.start
    }
}
