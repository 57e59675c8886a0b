//! Landmark frames delivered by the perception oracle
//! These are the wire types for recorded and simulated camera input

pub mod replay;
pub mod sim;
pub mod synthetic;

use serde::{Deserialize, Serialize};

pub use replay::{ReplaySource, SourceError};
pub use sim::SimulatedSource;

/// Face mesh size with refined iris landmarks
pub const FACE_MESH_LANDMARKS: usize = 478;

/// Left eye contour: outer corner, two upper, inner corner, two lower
pub const LEFT_EYE_IDX: [usize; 6] = [362, 385, 387, 263, 373, 380];
/// Right eye contour, same ordering as the left
pub const RIGHT_EYE_IDX: [usize; 6] = [33, 160, 158, 133, 153, 144];
/// Nose tip, used as the avatar anchor
pub const NOSE_IDX: usize = 1;

pub const HAND_LANDMARKS: usize = 21;
pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;

/// Normalized image coordinate, nominally in [0, 1] on both axes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// True when both coordinates lie inside the normalized range
    pub fn is_normalized(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// One detected face: the full ordered mesh
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceLandmarks(pub Vec<Point>);

impl FaceLandmarks {
    pub fn get(&self, idx: usize) -> Option<Point> {
        self.0.get(idx).copied()
    }
}

/// One detected hand: 21 ordered keypoints
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarks(pub Vec<Point>);

impl HandLandmarks {
    pub fn get(&self, idx: usize) -> Option<Point> {
        self.0.get(idx).copied()
    }
}

/// Everything the oracle saw in one camera frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture time in milliseconds since session start, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_ms: Option<u64>,
    /// Faces in detection order
    #[serde(default)]
    pub faces: Vec<FaceLandmarks>,
    /// Hands in detection order
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
}

impl LandmarkFrame {
    pub fn new(faces: Vec<FaceLandmarks>, hands: Vec<HandLandmarks>) -> Self {
        Self {
            t_ms: None,
            faces,
            hands,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Anything that yields landmark frames, one per camera frame.
///
/// `None` means the camera (or recording) has ended.
pub trait PerceptionOracle: Send + 'static {
    fn next_frame(&mut self) -> Option<LandmarkFrame>;
}

impl PerceptionOracle for Box<dyn PerceptionOracle> {
    fn next_frame(&mut self) -> Option<LandmarkFrame> {
        (**self).next_frame()
    }
}
