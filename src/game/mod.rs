//! Game simulation modules

pub mod blink;
pub mod combat;
pub mod landmarks;
pub mod r#match;
pub mod physics;
pub mod shield;
pub mod snapshot;
pub mod tracker;

pub use r#match::{GameEvent, Match, MatchState, PlayerState};

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two fixed player identities, one per screen half
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Player 1, owns the left half and shoots right
    Left,
    /// Player 2, owns the right half and shoots left
    Right,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Left, Slot::Right];

    pub fn index(self) -> usize {
        match self {
            Slot::Left => 0,
            Slot::Right => 1,
        }
    }

    pub fn opponent(self) -> Slot {
        match self {
            Slot::Left => Slot::Right,
            Slot::Right => Slot::Left,
        }
    }

    /// Side assignment by screen half
    pub fn for_x(x: f32, center_x: f32) -> Slot {
        if x < center_x {
            Slot::Left
        } else {
            Slot::Right
        }
    }

    /// Sign of this slot's projectile travel along x
    pub fn direction(self) -> f32 {
        match self {
            Slot::Left => 1.0,
            Slot::Right => -1.0,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.index() + 1)
    }
}
