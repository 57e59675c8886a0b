//! Snapshot building for the renderer

use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::combat::Projectile;
use super::physics::{PhysicsSystem, Rect};
use super::{GameEvent, Match, MatchState, Slot};

/// What the renderer needs to draw one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub slot: Slot,
    pub health: u32,
    /// Avatar sprite rectangle, absent until first detected
    pub avatar: Option<Rect>,
    /// False when the sprite would spill outside the frame and should be skipped
    pub visible: bool,
    pub shield_active: bool,
    /// +1 faces right, -1 faces left
    pub facing: f32,
}

/// One frame of match state for the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub session_id: Uuid,
    pub round: u32,
    pub frame: u64,
    pub state: MatchState,
    /// x of the line between the two halves, absent in single-player mode
    pub divider_x: Option<f32>,
    pub players: Vec<PlayerSnapshot>,
    pub projectiles: Vec<Projectile>,
    /// Events since the previous snapshot
    pub events: Vec<GameEvent>,
}

/// Builds snapshots at a fixed frame interval
pub struct SnapshotBuilder {
    /// Frames since last snapshot
    frames_since_snapshot: u32,
    /// Snapshot interval in frames
    snapshot_interval: u32,
    /// Events waiting for the next snapshot
    pending_events: Vec<GameEvent>,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            frames_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
            pending_events: Vec::new(),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.frames_since_snapshot += 1;
        if self.frames_since_snapshot >= self.snapshot_interval {
            self.frames_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for important events)
    pub fn force_next(&mut self) {
        self.frames_since_snapshot = self.snapshot_interval;
    }

    /// Queue a frame's events; anything other than a plain shot forces the next snapshot
    pub fn record(&mut self, events: Vec<GameEvent>) {
        if events.iter().any(|e| !matches!(e, GameEvent::Fired { .. })) {
            self.force_next();
        }
        self.pending_events.extend(events);
    }

    /// Build a snapshot message
    pub fn build(&mut self, game: &Match, now: Instant) -> MatchSnapshot {
        let config = game.config();
        let (frame_w, frame_h) = (config.frame_width as f32, config.frame_height as f32);

        let players = game
            .players()
            .iter()
            .filter(|p| config.two_player || p.slot == Slot::Left)
            .map(|p| PlayerSnapshot {
                slot: p.slot,
                health: p.health,
                avatar: p.avatar,
                visible: p
                    .avatar
                    .is_some_and(|rect| PhysicsSystem::fits_in_frame(&rect, frame_w, frame_h)),
                shield_active: game.is_shielded(p.slot, now),
                facing: p.slot.direction(),
            })
            .collect();

        MatchSnapshot {
            session_id: game.id(),
            round: game.round(),
            frame: game.frame(),
            state: game.state(),
            divider_x: config.two_player.then(|| config.center_x()),
            players,
            projectiles: game.projectiles().live().to_vec(),
            events: std::mem::take(&mut self.pending_events),
        }
    }
}
