//! Timed shields.
//!
//! A shield's lifetime is derived from its activation timestamp, so expiry
//! happens at the right moment no matter how irregular the frame cadence is,
//! and nothing outside the frame loop ever touches player state.

use std::time::{Duration, Instant};

/// Shield timing shared by both players
#[derive(Debug, Clone, Copy)]
pub struct ShieldTiming {
    /// How long a shield stays up
    pub duration: Duration,
    /// Minimum gap between a shield dropping and the next activation
    pub cooldown: Duration,
}

/// Outcome of an activation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Raised,
    AlreadyActive,
    CoolingDown { remaining: Duration },
}

/// Per-player shield record
#[derive(Debug, Clone, Default)]
pub struct Shield {
    activated_at: Option<Instant>,
    last_deactivation: Option<Instant>,
}

impl Shield {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the shield is up at `now`
    pub fn is_active(&self, now: Instant, timing: &ShieldTiming) -> bool {
        self.activated_at
            .is_some_and(|at| now.saturating_duration_since(at) < timing.duration)
    }

    /// When the shield last went down, if ever
    pub fn last_deactivation(&self) -> Option<Instant> {
        self.last_deactivation
    }

    /// Retire an expired shield. Returns true exactly once per activation,
    /// on the first call after it has run out.
    pub fn expire(&mut self, now: Instant, timing: &ShieldTiming) -> bool {
        match self.activated_at {
            Some(at) if now.saturating_duration_since(at) >= timing.duration => {
                self.activated_at = None;
                self.last_deactivation = Some(at + timing.duration);
                true
            }
            _ => false,
        }
    }

    /// Try to raise the shield
    pub fn activate(&mut self, now: Instant, timing: &ShieldTiming) -> Activation {
        self.expire(now, timing);

        if self.activated_at.is_some() {
            return Activation::AlreadyActive;
        }

        if let Some(down_at) = self.last_deactivation {
            let since = now.saturating_duration_since(down_at);
            if since < timing.cooldown {
                return Activation::CoolingDown {
                    remaining: timing.cooldown - since,
                };
            }
        }

        self.activated_at = Some(now);
        Activation::Raised
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
