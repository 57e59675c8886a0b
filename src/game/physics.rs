//! Screen-space geometry for avatars and projectiles

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in frame pixels, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }
}

/// Physics helpers for the duel arena
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Strict AABB overlap; touching edges do not count
    pub fn overlaps(a: &Rect, b: &Rect) -> bool {
        a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
    }

    /// Whether an x position is still on screen
    pub fn in_horizontal_bounds(x: f32, frame_width: f32) -> bool {
        (0.0..=frame_width).contains(&x)
    }

    /// Whether a sprite fits entirely inside the frame. Renderers skip sprites that don't.
    pub fn fits_in_frame(rect: &Rect, frame_width: f32, frame_height: f32) -> bool {
        rect.x >= 0.0
            && rect.y >= 0.0
            && rect.right() <= frame_width
            && rect.bottom() <= frame_height
    }
}
