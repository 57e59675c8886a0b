//! Seeded stand-in for the camera and landmark models.
//!
//! Two synthetic players sway side to side on their own half of the frame,
//! blink at random and now and then hold up a thumb. Same seed, same stream.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{synthetic, LandmarkFrame, PerceptionOracle, Point};

const OPEN_EAR: f32 = 0.32;
const CLOSED_EAR: f32 = 0.08;
const BLINK_FRAMES: u32 = 4;
const BLINK_CHANCE: f64 = 0.03;
const THUMBS_UP_FRAMES: u32 = 12;
const THUMBS_UP_CHANCE: f64 = 0.004;
const SWAY: f32 = 0.06;

#[derive(Debug, Clone, Default)]
struct FakePlayer {
    home_x: f32,
    phase: f32,
    blink_left: u32,
    thumbs_left: u32,
}

/// Deterministic synthetic landmark stream
#[derive(Debug)]
pub struct SimulatedSource {
    rng: ChaCha8Rng,
    frame_w: u32,
    frame_h: u32,
    frame: u64,
    limit: Option<u64>,
    players: [FakePlayer; 2],
}

impl SimulatedSource {
    pub fn new(seed: u64, frame_w: u32, frame_h: u32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let players = [
            FakePlayer {
                home_x: 0.25,
                phase: rng.gen_range(0.0..std::f32::consts::TAU),
                ..Default::default()
            },
            FakePlayer {
                home_x: 0.75,
                phase: rng.gen_range(0.0..std::f32::consts::TAU),
                ..Default::default()
            },
        ];

        Self {
            rng,
            frame_w,
            frame_h,
            frame: 0,
            limit: None,
            players,
        }
    }

    /// Stop after `frames` frames
    pub fn with_limit(mut self, frames: Option<u64>) -> Self {
        self.limit = frames;
        self
    }
}

impl PerceptionOracle for SimulatedSource {
    fn next_frame(&mut self) -> Option<LandmarkFrame> {
        if self.limit.is_some_and(|limit| self.frame >= limit) {
            return None;
        }
        let t = self.frame as f32;
        self.frame += 1;

        let mut faces = Vec::with_capacity(2);
        let mut hands = Vec::new();

        for player in self.players.iter_mut() {
            if player.blink_left == 0 && self.rng.gen_bool(BLINK_CHANCE) {
                player.blink_left = BLINK_FRAMES;
            }
            if player.thumbs_left == 0 && self.rng.gen_bool(THUMBS_UP_CHANCE) {
                player.thumbs_left = THUMBS_UP_FRAMES;
            }

            let ear = if player.blink_left > 0 {
                player.blink_left -= 1;
                CLOSED_EAR
            } else {
                OPEN_EAR
            };

            let nose = Point::new(
                player.home_x + SWAY * (t * 0.04 + player.phase).sin(),
                0.5 + 0.5 * SWAY * (t * 0.03 + player.phase).cos(),
            );
            faces.push(synthetic::face(nose, ear, self.frame_w, self.frame_h));

            if player.thumbs_left > 0 {
                player.thumbs_left -= 1;
                hands.push(synthetic::hand(Point::new(player.home_x, 0.85), true));
            }
        }

        Some(LandmarkFrame::new(faces, hands))
    }
}
