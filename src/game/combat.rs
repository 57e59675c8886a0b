//! Combat system - projectiles, hit detection, damage

use serde::{Deserialize, Serialize};

use super::physics::{PhysicsSystem, Rect};
use super::Slot;

/// Projectile dimensions and travel speed
#[derive(Debug, Clone, Copy)]
pub struct ProjectileStats {
    pub width: f32,
    pub height: f32,
    /// Pixels per frame
    pub speed: f32,
}

/// Live projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Spawn order; lower is older
    pub seq: u64,
    pub owner: Slot,
    pub rect: Rect,
}

impl Projectile {
    /// Spawn at the edge of the owner's avatar that faces the opponent
    pub fn new(seq: u64, owner: Slot, avatar: &Rect, stats: &ProjectileStats) -> Self {
        let x = match owner {
            Slot::Left => avatar.right(),
            Slot::Right => avatar.x - stats.width,
        };
        let y = avatar.center_y() - stats.height / 2.0;

        Self {
            seq,
            owner,
            rect: Rect::new(x, y, stats.width, stats.height),
        }
    }

    /// Move one frame along the owner's facing direction, returns false once off screen
    pub fn update(&mut self, delta: f32, frame_width: f32) -> bool {
        self.rect.x += self.owner.direction() * delta;
        PhysicsSystem::in_horizontal_bounds(self.rect.x, frame_width)
    }

    /// Check collision with a target
    pub fn check_hit(&self, target: &Rect) -> bool {
        PhysicsSystem::overlaps(&self.rect, target)
    }
}

/// Something a projectile can hit this frame
#[derive(Debug, Clone, Copy)]
pub struct CollisionTarget {
    pub slot: Slot,
    pub rect: Rect,
    pub shielded: bool,
}

/// Damage owed to a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub shooter: Slot,
    pub target: Slot,
    pub amount: u32,
}

/// How a projectile ended on contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    Hit(DamageEvent),
    Blocked { shooter: Slot, target: Slot },
}

/// Owns every live projectile, oldest first
#[derive(Debug, Default)]
pub struct ProjectileManager {
    live: Vec<Projectile>,
    next_seq: u64,
}

impl ProjectileManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> &[Projectile] {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Fire a projectile from `owner`'s avatar
    pub fn spawn(&mut self, owner: Slot, avatar: &Rect, stats: &ProjectileStats) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.push(Projectile::new(seq, owner, avatar, stats));
        seq
    }

    /// Advance every projectile by `delta` and drop those that left the frame.
    /// Returns how many were dropped.
    pub fn advance(&mut self, delta: f32, frame_width: f32) -> usize {
        let before = self.live.len();
        self.live.retain_mut(|p| p.update(delta, frame_width));
        before - self.live.len()
    }

    /// Evict the oldest projectiles until at most `max_live` remain
    pub fn enforce_cap(&mut self, max_live: usize) -> usize {
        let excess = self.live.len().saturating_sub(max_live);
        self.live.drain(..excess);
        excess
    }

    /// Test every projectile against every opposing target. A projectile is
    /// consumed by the first target it touches, shielded or not.
    pub fn resolve_collisions(&mut self, targets: &[CollisionTarget], damage: u32) -> Vec<Impact> {
        let mut impacts = Vec::new();

        self.live.retain(|projectile| {
            let hit = targets
                .iter()
                .filter(|t| t.slot != projectile.owner)
                .find(|t| projectile.check_hit(&t.rect));

            match hit {
                Some(target) if target.shielded => {
                    impacts.push(Impact::Blocked {
                        shooter: projectile.owner,
                        target: target.slot,
                    });
                    false
                }
                Some(target) => {
                    impacts.push(Impact::Hit(DamageEvent {
                        shooter: projectile.owner,
                        target: target.slot,
                        amount: damage,
                    }));
                    false
                }
                None => true,
            }
        });

        impacts
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }
}

/// Combat rules
pub struct CombatSystem;

impl CombatSystem {
    /// Apply damage to health, returns (new_health, is_dead)
    pub fn apply_damage(current_health: u32, damage: u32) -> (u32, bool) {
        let new_health = current_health.saturating_sub(damage);
        (new_health, new_health == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> ProjectileStats {
        ProjectileStats {
            width: 30.0,
            height: 15.0,
            speed: 10.0,
        }
    }

    fn avatar(x: f32) -> Rect {
        Rect::new(x, 200.0, 100.0, 75.0)
    }

    #[test]
    fn spawn_faces_the_opponent() {
        let left = Projectile::new(0, Slot::Left, &avatar(100.0), &stats());
        assert_eq!(left.rect, Rect::new(200.0, 230.0, 30.0, 15.0));

        let right = Projectile::new(1, Slot::Right, &avatar(400.0), &stats());
        assert_eq!(right.rect.x, 370.0);
    }

    #[test]
    fn advance_removes_exactly_the_exited() {
        let mut manager = ProjectileManager::new();
        // Left-slot shots spawn at avatar.right(), so these start at x = 580, 500, 300
        for x in [480.0, 400.0, 200.0] {
            manager.spawn(Slot::Left, &avatar(x), &stats());
        }
        // Right-slot shot starts at x = 20
        manager.spawn(Slot::Right, &avatar(50.0), &stats());

        let removed = manager.advance(70.0, 640.0);
        // 580 -> 650 and 20 -> -50 leave the frame
        assert_eq!(removed, 2);
        let xs: Vec<f32> = manager.live().iter().map(|p| p.rect.x).collect();
        assert_eq!(xs, vec![570.0, 370.0]);
    }

    #[test]
    fn cap_evicts_oldest_first() {
        let mut manager = ProjectileManager::new();
        for _ in 0..60 {
            manager.spawn(Slot::Left, &avatar(0.0), &stats());
        }

        assert_eq!(manager.enforce_cap(50), 10);
        assert_eq!(manager.len(), 50);
        assert_eq!(manager.live()[0].seq, 10);
        assert_eq!(manager.live()[49].seq, 59);
        assert_eq!(manager.enforce_cap(50), 0);
    }

    #[test]
    fn shielded_target_absorbs_without_damage() {
        let mut manager = ProjectileManager::new();
        manager.spawn(Slot::Right, &avatar(300.0), &stats());
        let target = CollisionTarget {
            slot: Slot::Left,
            rect: avatar(200.0),
            shielded: true,
        };

        let impacts = manager.resolve_collisions(&[target], 10);
        assert_eq!(
            impacts,
            vec![Impact::Blocked {
                shooter: Slot::Right,
                target: Slot::Left
            }]
        );
        assert!(manager.is_empty());
    }

    #[test]
    fn unshielded_target_takes_fixed_damage() {
        let mut manager = ProjectileManager::new();
        manager.spawn(Slot::Right, &avatar(300.0), &stats());
        let target = CollisionTarget {
            slot: Slot::Left,
            rect: avatar(200.0),
            shielded: false,
        };

        let impacts = manager.resolve_collisions(&[target], 10);
        assert_eq!(
            impacts,
            vec![Impact::Hit(DamageEvent {
                shooter: Slot::Right,
                target: Slot::Left,
                amount: 10
            })]
        );
        assert!(manager.is_empty());
    }

    #[test]
    fn owner_is_never_hit() {
        let mut manager = ProjectileManager::new();
        manager.spawn(Slot::Left, &avatar(100.0), &stats());
        let own = CollisionTarget {
            slot: Slot::Left,
            rect: Rect::new(150.0, 200.0, 100.0, 75.0),
            shielded: false,
        };

        assert!(manager.resolve_collisions(&[own], 10).is_empty());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn projectile_resolves_at_most_once() {
        let mut manager = ProjectileManager::new();
        manager.spawn(Slot::Left, &avatar(100.0), &stats());
        let target = CollisionTarget {
            slot: Slot::Right,
            rect: Rect::new(190.0, 200.0, 100.0, 75.0),
            shielded: false,
        };

        // Same slot listed twice still yields a single impact
        let impacts = manager.resolve_collisions(&[target, target], 10);
        assert_eq!(impacts.len(), 1);
    }

    #[test]
    fn damage_saturates_at_zero() {
        assert_eq!(CombatSystem::apply_damage(100, 10), (90, false));
        assert_eq!(CombatSystem::apply_damage(10, 10), (0, true));
        assert_eq!(CombatSystem::apply_damage(5, 10), (0, true));
    }
}
