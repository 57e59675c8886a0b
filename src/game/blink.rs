//! Blink gate - hysteresis on the eye aspect ratio

use std::time::{Duration, Instant};

/// Gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    /// Eyes seen fully open since the last shot
    Armed,
    /// Fired, waiting for the eyes to open again
    #[default]
    Unarmed,
}

/// Thresholds shared by every gate
#[derive(Debug, Clone, Copy)]
pub struct BlinkThresholds {
    pub blink: f32,
    pub open: f32,
    pub cooldown: Duration,
}

/// Per-player state machine that turns a continuous EAR into discrete shots.
///
/// Opening the eyes past `open` arms the gate; closing them below `blink`
/// while armed fires once, provided `cooldown` has passed since the last shot.
/// Anything in between changes nothing.
#[derive(Debug, Clone, Default)]
pub struct BlinkGate {
    state: GateState,
    last_fire: Option<Instant>,
}

impl BlinkGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn last_fire(&self) -> Option<Instant> {
        self.last_fire
    }

    /// Feed one frame's average EAR. Returns true when the player fires.
    pub fn update(&mut self, ear: f32, now: Instant, thresholds: &BlinkThresholds) -> bool {
        if ear > thresholds.open {
            self.state = GateState::Armed;
            return false;
        }

        if ear < thresholds.blink
            && self.state == GateState::Armed
            && self.cooled_down(now, thresholds.cooldown)
        {
            self.state = GateState::Unarmed;
            self.last_fire = Some(now);
            return true;
        }

        false
    }

    fn cooled_down(&self, now: Instant, cooldown: Duration) -> bool {
        self.last_fire
            .map_or(true, |last| now.saturating_duration_since(last) >= cooldown)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
