//! Player/avatar tracking: faces to slots, positions across frames

use std::time::Instant;

use tracing::debug;

use crate::config::GameConfig;
use crate::perception::FaceLandmarks;

use super::blink::BlinkThresholds;
use super::landmarks::{average_ear, avatar_anchor, face_is_valid};
use super::physics::Rect;
use super::{PlayerState, Slot};

/// A face that claimed a slot this frame
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub slot: Slot,
    /// Nose position in pixels
    pub anchor: (f32, f32),
    /// Where the avatar sprite goes
    pub avatar: Rect,
    /// Average eye aspect ratio, if the eyes gave a usable signal
    pub ear: Option<f32>,
}

/// Turn this frame's faces into at most one candidate per slot.
///
/// Faces are taken in detection order; a face whose slot is already taken is
/// dropped, as is any face with a missing or out-of-range landmark.
pub fn collect_candidates(faces: &[FaceLandmarks], config: &GameConfig) -> Vec<Candidate> {
    let max_faces = if config.two_player { 2 } else { 1 };
    let used = || {
        std::iter::once(config.nose_index)
            .chain(config.left_eye)
            .chain(config.right_eye)
    };

    let mut candidates: Vec<Candidate> = Vec::with_capacity(max_faces);

    for (i, face) in faces.iter().take(max_faces).enumerate() {
        if !face_is_valid(face, used()) {
            debug!(face = i, "Skipping face with invalid landmarks");
            continue;
        }
        let Some(anchor) = avatar_anchor(
            face,
            config.nose_index,
            config.frame_width,
            config.frame_height,
        ) else {
            continue;
        };

        let slot = if config.two_player {
            Slot::for_x(anchor.0, config.center_x())
        } else {
            Slot::Left
        };
        if candidates.iter().any(|c| c.slot == slot) {
            debug!(face = i, slot = %slot, "Slot already claimed this frame");
            continue;
        }

        let offset = config.avatar_offsets[slot.index()];
        candidates.push(Candidate {
            slot,
            anchor,
            avatar: Rect::new(
                anchor.0 - offset.x,
                anchor.1 - offset.y,
                config.avatar_width,
                config.avatar_height,
            ),
            ear: average_ear(
                face,
                &config.left_eye,
                &config.right_eye,
                config.frame_width,
                config.frame_height,
            ),
        });
    }

    candidates
}

/// Move tracked players to their candidates and run their blink gates.
/// Players without a candidate keep their last position. Returns the slots that fired.
pub fn apply_candidates(
    players: &mut [PlayerState; 2],
    candidates: &[Candidate],
    now: Instant,
    thresholds: &BlinkThresholds,
) -> Vec<Slot> {
    let mut fired = Vec::new();

    for candidate in candidates {
        let player = &mut players[candidate.slot.index()];
        player.anchor = Some(candidate.anchor);
        player.avatar = Some(candidate.avatar);

        if let Some(ear) = candidate.ear {
            if player.gate.update(ear, now, thresholds) {
                fired.push(candidate.slot);
            }
        }
    }

    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::{synthetic, Point, NOSE_IDX};
    use std::time::Duration;

    fn face_at(x: f32, ear: f32) -> FaceLandmarks {
        synthetic::face(Point::new(x, 0.5), ear, 640, 480)
    }

    fn thresholds() -> BlinkThresholds {
        BlinkThresholds {
            blink: 0.15,
            open: 0.25,
            cooldown: Duration::from_secs(1),
        }
    }

    #[test]
    fn faces_map_to_their_half() {
        let config = GameConfig::default();
        let candidates = collect_candidates(&[face_at(0.8, 0.3), face_at(0.2, 0.3)], &config);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].slot, Slot::Right);
        assert_eq!(candidates[1].slot, Slot::Left);
        assert_eq!(candidates[1].anchor, (128.0, 240.0));
        assert_eq!(candidates[1].avatar, Rect::new(78.0, 202.5, 100.0, 75.0));
    }

    #[test]
    fn first_face_wins_a_contested_half() {
        let config = GameConfig::default();
        let candidates = collect_candidates(&[face_at(0.3, 0.3), face_at(0.1, 0.3)], &config);
        assert_eq!(candidates.len(), 1);
        assert!((candidates[0].anchor.0 - 192.0).abs() < 1e-3);
    }

    #[test]
    fn invalid_face_is_skipped() {
        let config = GameConfig::default();
        let mut bad = face_at(0.8, 0.3);
        bad.0[NOSE_IDX] = Point::new(1.5, 0.5);

        let candidates = collect_candidates(&[bad, face_at(0.2, 0.3)], &config);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].slot, Slot::Left);
    }

    #[test]
    fn only_first_two_faces_are_considered() {
        let config = GameConfig::default();
        let faces = [face_at(0.2, 0.3), face_at(0.25, 0.3), face_at(0.8, 0.3)];
        let candidates = collect_candidates(&faces, &config);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn single_player_always_takes_left_slot() {
        let config = GameConfig {
            two_player: false,
            ..GameConfig::default()
        };
        let candidates = collect_candidates(&[face_at(0.8, 0.3), face_at(0.2, 0.3)], &config);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].slot, Slot::Left);
        assert!((candidates[0].anchor.0 - 512.0).abs() < 1e-3);
    }

    #[test]
    fn lost_player_keeps_position_and_cannot_fire() {
        let config = GameConfig::default();
        let t = thresholds();
        let now = Instant::now();
        let mut players = [PlayerState::new(Slot::Left, 100), PlayerState::new(Slot::Right, 100)];

        let open = collect_candidates(&[face_at(0.2, 0.3), face_at(0.8, 0.3)], &config);
        assert!(apply_candidates(&mut players, &open, now, &t).is_empty());
        let right_avatar = players[1].avatar;

        // Right player drops out while the left one blinks
        let blink = collect_candidates(&[face_at(0.2, 0.05)], &config);
        let fired = apply_candidates(&mut players, &blink, now + Duration::from_millis(33), &t);
        assert_eq!(fired, vec![Slot::Left]);
        assert_eq!(players[1].avatar, right_avatar);
    }
}
