//! Match state and the per-frame update pipeline

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::perception::{HandLandmarks, LandmarkFrame, WRIST};

use super::blink::{BlinkGate, BlinkThresholds};
use super::combat::{
    CollisionTarget, CombatSystem, DamageEvent, Impact, ProjectileManager, ProjectileStats,
};
use super::landmarks::{classify_hand_gesture, hand_is_valid, Gesture};
use super::physics::Rect;
use super::shield::{Activation, Shield, ShieldTiming};
use super::tracker::{apply_candidates, collect_candidates};
use super::Slot;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum MatchState {
    /// Match in progress
    Playing,
    /// Someone ran out of health; `winner` is `None` for a draw
    Finished { winner: Option<Slot> },
}

/// Player state in a match
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub slot: Slot,
    pub health: u32,

    // Last known position, kept when tracking is lost
    pub anchor: Option<(f32, f32)>,
    pub avatar: Option<Rect>,

    pub gate: BlinkGate,
    pub shield: Shield,

    // Stats
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub hits_blocked: u32,
}

impl PlayerState {
    pub fn new(slot: Slot, health: u32) -> Self {
        Self {
            slot,
            health,
            anchor: None,
            avatar: None,
            gate: BlinkGate::new(),
            shield: Shield::new(),
            shots_fired: 0,
            shots_hit: 0,
            hits_blocked: 0,
        }
    }
}

/// Everything that happened in a frame, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Fired { slot: Slot },
    ShieldRaised { slot: Slot },
    ShieldDropped { slot: Slot },
    Hit { shooter: Slot, target: Slot, damage: u32, health: u32 },
    Blocked { shooter: Slot, target: Slot },
    MatchFinished { winner: Option<Slot> },
    MatchReset,
}

/// The duel: both players, their projectiles and the match phase
pub struct Match {
    id: Uuid,
    config: GameConfig,
    state: MatchState,
    players: [PlayerState; 2],
    projectiles: ProjectileManager,
    frame: u64,
    round: u32,
    thresholds: BlinkThresholds,
    shield_timing: ShieldTiming,
    projectile_stats: ProjectileStats,
}

impl Match {
    pub fn new(config: GameConfig) -> Self {
        let thresholds = BlinkThresholds {
            blink: config.blink_threshold,
            open: config.open_threshold,
            cooldown: config.blink_cooldown,
        };
        let shield_timing = ShieldTiming {
            duration: config.shield_duration,
            cooldown: config.shield_cooldown,
        };
        let projectile_stats = ProjectileStats {
            width: config.projectile_width,
            height: config.projectile_height,
            speed: config.projectile_speed,
        };
        let players = Slot::ALL.map(|slot| PlayerState::new(slot, config.starting_health));

        Self {
            id: Uuid::new_v4(),
            config,
            state: MatchState::Playing,
            players,
            projectiles: ProjectileManager::new(),
            frame: 0,
            round: 1,
            thresholds,
            shield_timing,
            projectile_stats,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn players(&self) -> &[PlayerState; 2] {
        &self.players
    }

    pub fn player(&self, slot: Slot) -> &PlayerState {
        &self.players[slot.index()]
    }

    pub fn projectiles(&self) -> &ProjectileManager {
        &self.projectiles
    }

    /// Frames processed since the session started
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// 1 for the first match, +1 per replay
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_shielded(&self, slot: Slot, now: Instant) -> bool {
        self.player(slot).shield.is_active(now, &self.shield_timing)
    }

    /// Run one frame of the pipeline
    pub fn step(&mut self, frame: &LandmarkFrame, now: Instant) -> Vec<GameEvent> {
        self.frame += 1;
        let mut events = Vec::new();

        if self.state != MatchState::Playing {
            return events;
        }

        self.expire_shields(now, &mut events);
        let fired = self.track_players(frame, now, &mut events);
        self.handle_gestures(&frame.hands, now, &mut events);
        self.update_projectiles(&fired);
        let hits = self.resolve_collisions(now, &mut events);
        self.apply_damage(hits, &mut events);
        self.check_win_condition(&mut events);

        events
    }

    /// Start a fresh round: full health, no shields, no projectiles, nobody tracked
    pub fn reset(&mut self) {
        self.players = Slot::ALL.map(|slot| PlayerState::new(slot, self.config.starting_health));
        self.projectiles.clear();
        self.state = MatchState::Playing;
        self.round += 1;
        info!(session_id = %self.id, round = self.round, "Match reset");
    }

    fn expire_shields(&mut self, now: Instant, events: &mut Vec<GameEvent>) {
        for player in self.players.iter_mut() {
            if player.shield.expire(now, &self.shield_timing) {
                debug!(session_id = %self.id, slot = %player.slot, "Shield deactivated");
                events.push(GameEvent::ShieldDropped { slot: player.slot });
            }
        }
    }

    fn track_players(
        &mut self,
        frame: &LandmarkFrame,
        now: Instant,
        events: &mut Vec<GameEvent>,
    ) -> Vec<Slot> {
        let candidates = collect_candidates(&frame.faces, &self.config);
        let fired = apply_candidates(&mut self.players, &candidates, now, &self.thresholds);

        for &slot in &fired {
            self.players[slot.index()].shots_fired += 1;
            debug!(session_id = %self.id, slot = %slot, "Blink shot");
            events.push(GameEvent::Fired { slot });
        }

        fired
    }

    fn handle_gestures(
        &mut self,
        hands: &[HandLandmarks],
        now: Instant,
        events: &mut Vec<GameEvent>,
    ) {
        let max_hands = if self.config.two_player { 2 } else { 1 };

        for hand in hands.iter().take(max_hands) {
            if !hand_is_valid(hand) {
                debug!(session_id = %self.id, "Skipping hand with invalid landmarks");
                continue;
            }
            if classify_hand_gesture(hand, self.config.gesture_margin) != Gesture::ThumbsUp {
                continue;
            }
            let Some(wrist) = hand.get(WRIST) else {
                continue;
            };

            let slot = if self.config.two_player {
                Slot::for_x(wrist.x * self.config.frame_width as f32, self.config.center_x())
            } else {
                Slot::Left
            };

            match self.players[slot.index()].shield.activate(now, &self.shield_timing) {
                Activation::Raised => {
                    debug!(session_id = %self.id, slot = %slot, "Shield activated");
                    events.push(GameEvent::ShieldRaised { slot });
                }
                Activation::AlreadyActive => {}
                Activation::CoolingDown { remaining } => {
                    debug!(
                        session_id = %self.id,
                        slot = %slot,
                        remaining_ms = remaining.as_millis() as u64,
                        "Shield still cooling down"
                    );
                }
            }
        }
    }

    fn update_projectiles(&mut self, fired: &[Slot]) {
        let frame_width = self.config.frame_width as f32;
        self.projectiles.advance(self.projectile_stats.speed, frame_width);

        for &slot in fired {
            if let Some(avatar) = self.players[slot.index()].avatar {
                self.projectiles.spawn(slot, &avatar, &self.projectile_stats);
            }
        }

        let evicted = self.projectiles.enforce_cap(self.config.max_projectiles);
        if evicted > 0 {
            debug!(session_id = %self.id, evicted, "Projectile cap reached");
        }
    }

    fn resolve_collisions(
        &mut self,
        now: Instant,
        events: &mut Vec<GameEvent>,
    ) -> Vec<DamageEvent> {
        let targets: Vec<CollisionTarget> = self
            .players
            .iter()
            .filter_map(|p| {
                p.avatar.map(|rect| CollisionTarget {
                    slot: p.slot,
                    rect,
                    shielded: p.shield.is_active(now, &self.shield_timing),
                })
            })
            .collect();

        let impacts = self
            .projectiles
            .resolve_collisions(&targets, self.config.damage_per_hit);

        let mut hits = Vec::new();
        for impact in impacts {
            match impact {
                Impact::Hit(hit) => hits.push(hit),
                Impact::Blocked { shooter, target } => {
                    self.players[target.index()].hits_blocked += 1;
                    debug!(
                        session_id = %self.id,
                        shooter = %shooter,
                        target = %target,
                        "Shot absorbed by shield"
                    );
                    events.push(GameEvent::Blocked { shooter, target });
                }
            }
        }
        hits
    }

    fn apply_damage(&mut self, hits: Vec<DamageEvent>, events: &mut Vec<GameEvent>) {
        for hit in hits {
            let target = &mut self.players[hit.target.index()];
            let (new_health, _) = CombatSystem::apply_damage(target.health, hit.amount);
            target.health = new_health;
            self.players[hit.shooter.index()].shots_hit += 1;

            debug!(
                session_id = %self.id,
                shooter = %hit.shooter,
                target = %hit.target,
                health = new_health,
                "Hit"
            );
            events.push(GameEvent::Hit {
                shooter: hit.shooter,
                target: hit.target,
                damage: hit.amount,
                health: new_health,
            });
        }
    }

    /// Check win condition
    fn check_win_condition(&mut self, events: &mut Vec<GameEvent>) {
        if self.state != MatchState::Playing {
            return;
        }

        let left_down = self.players[Slot::Left.index()].health == 0;
        let right_down = self.players[Slot::Right.index()].health == 0;

        let winner = match (left_down, right_down) {
            (false, false) => return,
            (true, true) => None,
            (true, false) => Some(Slot::Right),
            (false, true) => Some(Slot::Left),
        };

        self.state = MatchState::Finished { winner };
        self.projectiles.clear();

        match winner {
            Some(slot) => info!(
                session_id = %self.id,
                round = self.round,
                winner = %slot,
                "Match finished"
            ),
            None => info!(session_id = %self.id, round = self.round, "Match finished in a draw"),
        }
        events.push(GameEvent::MatchFinished { winner });
    }
}
