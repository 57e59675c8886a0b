//! Whole-match scenarios driven through landmark frames

use std::time::{Duration, Instant};

use blinkshot::game::{GameEvent, Match, MatchState, Slot};
use blinkshot::perception::{synthetic, FaceLandmarks, HandLandmarks, LandmarkFrame, Point};
use blinkshot::GameConfig;

const OPEN: f32 = 0.3;
const CLOSED: f32 = 0.05;
const FRAME: Duration = Duration::from_millis(33);

fn face(x: f32, ear: f32) -> FaceLandmarks {
    synthetic::face(Point::new(x, 0.5), ear, 640, 480)
}

fn duel(left_ear: f32, right_ear: f32) -> LandmarkFrame {
    LandmarkFrame::new(vec![face(0.25, left_ear), face(0.75, right_ear)], vec![])
}

fn with_hands(mut frame: LandmarkFrame, hands: Vec<HandLandmarks>) -> LandmarkFrame {
    frame.hands = hands;
    frame
}

/// Drives a match on a synthetic clock
struct Driver {
    game: Match,
    start: Instant,
    elapsed: Duration,
}

impl Driver {
    fn new(config: GameConfig) -> Self {
        Self {
            game: Match::new(config),
            start: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    fn step(&mut self, frame: &LandmarkFrame) -> Vec<GameEvent> {
        self.elapsed += FRAME;
        self.game.step(frame, self.start + self.elapsed)
    }

    /// Let the blink cooldown run out
    fn wait_cooldown(&mut self) {
        self.elapsed += Duration::from_millis(1_100);
    }

    /// Right player blinks once; run frames until the shot resolves.
    /// `extra_hands` ride along on every frame.
    fn right_shoots(&mut self, extra_hands: Vec<HandLandmarks>) -> Vec<GameEvent> {
        self.wait_cooldown();
        self.step(&with_hands(duel(OPEN, OPEN), extra_hands.clone()));
        let fired = self.step(&with_hands(duel(OPEN, CLOSED), extra_hands.clone()));
        assert!(fired.contains(&GameEvent::Fired { slot: Slot::Right }));

        for _ in 0..100 {
            let events = self.step(&with_hands(duel(OPEN, OPEN), extra_hands.clone()));
            if events
                .iter()
                .any(|e| matches!(e, GameEvent::Hit { .. } | GameEvent::Blocked { .. }))
            {
                return events;
            }
        }
        panic!("shot never resolved");
    }
}

#[test]
fn three_hits_leave_seventy_health() {
    let mut driver = Driver::new(GameConfig::default());
    driver.step(&duel(OPEN, OPEN));

    for expected in [90, 80, 70] {
        let events = driver.right_shoots(vec![]);
        assert!(events.contains(&GameEvent::Hit {
            shooter: Slot::Right,
            target: Slot::Left,
            damage: 10,
            health: expected,
        }));
    }

    assert_eq!(driver.game.player(Slot::Left).health, 70);
    assert_eq!(driver.game.player(Slot::Right).health, 100);
    assert_eq!(driver.game.state(), MatchState::Playing);
}

#[test]
fn tenth_hit_finishes_the_match() {
    let mut driver = Driver::new(GameConfig::default());
    driver.step(&duel(OPEN, OPEN));

    for _ in 0..9 {
        driver.right_shoots(vec![]);
        assert_eq!(driver.game.state(), MatchState::Playing);
    }
    assert_eq!(driver.game.player(Slot::Left).health, 10);

    let events = driver.right_shoots(vec![]);
    assert_eq!(
        events.last(),
        Some(&GameEvent::MatchFinished {
            winner: Some(Slot::Right)
        })
    );
    assert_eq!(driver.game.player(Slot::Left).health, 0);
    assert_eq!(
        driver.game.state(),
        MatchState::Finished {
            winner: Some(Slot::Right)
        }
    );
    assert!(driver.game.projectiles().is_empty());
}

#[test]
fn finished_match_takes_no_more_damage() {
    let config = GameConfig {
        starting_health: 10,
        ..GameConfig::default()
    };
    let mut driver = Driver::new(config);
    driver.step(&duel(OPEN, OPEN));
    driver.right_shoots(vec![]);
    assert!(matches!(driver.game.state(), MatchState::Finished { .. }));

    // Both keep blinking at each other; nothing moves any more
    for _ in 0..5 {
        driver.wait_cooldown();
        assert!(driver.step(&duel(OPEN, OPEN)).is_empty());
        assert!(driver.step(&duel(CLOSED, CLOSED)).is_empty());
    }
    assert!(driver.game.projectiles().is_empty());
    assert_eq!(driver.game.player(Slot::Left).health, 0);
    assert_eq!(driver.game.player(Slot::Right).health, 10);
}

#[test]
fn shield_absorbs_the_shot() {
    let mut driver = Driver::new(GameConfig::default());
    driver.step(&duel(OPEN, OPEN));

    let thumbs_up_left = synthetic::hand(Point::new(0.2, 0.85), true);
    let events = driver.right_shoots(vec![thumbs_up_left]);

    assert!(events.contains(&GameEvent::Blocked {
        shooter: Slot::Right,
        target: Slot::Left
    }));
    assert_eq!(driver.game.player(Slot::Left).health, 100);
    assert_eq!(driver.game.player(Slot::Left).hits_blocked, 1);
    assert!(driver.game.projectiles().is_empty());
}

#[test]
fn shield_wears_off_then_shots_land_again() {
    let mut driver = Driver::new(GameConfig::default());
    driver.step(&with_hands(
        duel(OPEN, OPEN),
        vec![synthetic::hand(Point::new(0.2, 0.85), true)],
    ));

    // Well past the 5s shield
    driver.elapsed += Duration::from_secs(6);
    let events = driver.right_shoots(vec![]);
    assert!(!driver.game.is_shielded(Slot::Left, driver.start + driver.elapsed));
    assert!(events.iter().any(|e| matches!(e, GameEvent::Hit { target: Slot::Left, .. })));
    assert_eq!(driver.game.player(Slot::Left).health, 90);
}

#[test]
fn untracked_opponent_cannot_be_hit() {
    let mut driver = Driver::new(GameConfig::default());
    let right_only = |ear| LandmarkFrame::new(vec![face(0.75, ear)], vec![]);

    driver.step(&right_only(OPEN));
    driver.step(&right_only(CLOSED));
    assert_eq!(driver.game.projectiles().len(), 1);

    for _ in 0..60 {
        assert!(driver.step(&right_only(OPEN)).is_empty());
    }
    assert!(driver.game.projectiles().is_empty());
    assert_eq!(driver.game.player(Slot::Left).health, 100);
}

#[test]
fn lost_face_keeps_its_avatar_in_the_line_of_fire() {
    let mut driver = Driver::new(GameConfig::default());
    driver.step(&duel(OPEN, OPEN));
    let left_avatar = driver.game.player(Slot::Left).avatar;

    // Left player drops out of view; right keeps shooting at the last position
    let right_only = |ear| LandmarkFrame::new(vec![face(0.75, ear)], vec![]);
    driver.step(&right_only(CLOSED));
    let mut hit = false;
    for _ in 0..40 {
        let events = driver.step(&right_only(OPEN));
        hit |= events.iter().any(|e| matches!(e, GameEvent::Hit { target: Slot::Left, .. }));
    }

    assert!(hit);
    assert_eq!(driver.game.player(Slot::Left).avatar, left_avatar);
    assert_eq!(driver.game.player(Slot::Left).health, 90);
}

#[test]
fn replay_restores_a_clean_match() {
    let config = GameConfig {
        starting_health: 10,
        ..GameConfig::default()
    };
    let mut driver = Driver::new(config);
    driver.step(&with_hands(
        duel(OPEN, OPEN),
        vec![synthetic::hand(Point::new(0.8, 0.85), true)],
    ));
    driver.elapsed += Duration::from_secs(6);
    driver.right_shoots(vec![]);
    assert!(matches!(driver.game.state(), MatchState::Finished { .. }));

    driver.game.reset();

    assert_eq!(driver.game.state(), MatchState::Playing);
    assert!(driver.game.projectiles().is_empty());
    let now = driver.start + driver.elapsed;
    for slot in Slot::ALL {
        assert_eq!(driver.game.player(slot).health, 10);
        assert!(!driver.game.is_shielded(slot, now));
    }

    // And the fresh round plays normally
    driver.step(&duel(OPEN, OPEN));
    let events = driver.right_shoots(vec![]);
    assert!(events.iter().any(|e| matches!(e, GameEvent::MatchFinished { .. })));
}

#[test]
fn single_player_mode_tracks_one_face() {
    let config = GameConfig {
        two_player: false,
        ..GameConfig::default()
    };
    let mut driver = Driver::new(config);

    // The only tracked face sits on the right but still plays slot 0 and shoots right
    let solo = |ear| LandmarkFrame::new(vec![face(0.6, ear), face(0.2, OPEN)], vec![]);
    driver.step(&solo(OPEN));
    let events = driver.step(&solo(CLOSED));

    assert_eq!(events, vec![GameEvent::Fired { slot: Slot::Left }]);
    assert!(driver.game.player(Slot::Right).avatar.is_none());
    assert_eq!(driver.game.projectiles().live()[0].owner, Slot::Left);
}
