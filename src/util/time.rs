//! Time utilities for the frame loop

use std::time::{Duration, Instant};

/// Maps frame capture offsets onto the session timeline
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    start: Instant,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { start }
    }

    /// Timestamp for a frame: its recorded offset if it has one, else the wall clock
    pub fn frame_time(&self, t_ms: Option<u64>) -> Instant {
        match t_ms {
            Some(ms) => self.start + Duration::from_millis(ms),
            None => Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_micros(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_offsets_are_relative_to_start() {
        let start = Instant::now();
        let clock = SessionClock::starting_at(start);
        assert_eq!(clock.frame_time(Some(1_500)), start + Duration::from_millis(1_500));
        assert!(clock.frame_time(None) >= start);
    }
}
