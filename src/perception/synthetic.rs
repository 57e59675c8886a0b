//! Hand-built landmark sets.
//!
//! The simulator uses these to fake players, and tests use them to describe a
//! face by the two things the engine reads from it: where the nose is and how
//! open the eyes are.

use super::{
    FaceLandmarks, HandLandmarks, Point, FACE_MESH_LANDMARKS, HAND_LANDMARKS, INDEX_TIP,
    LEFT_EYE_IDX, MIDDLE_TIP, NOSE_IDX, RIGHT_EYE_IDX, THUMB_TIP, WRIST,
};

/// Eye width in pixels at the working resolution
const EYE_WIDTH_PX: f32 = 30.0;
/// Horizontal distance from the nose to each eye centre, in pixels
const EYE_SPREAD_PX: f32 = 32.0;
/// Vertical distance from the nose up to the eye line, in pixels
const EYE_RISE_PX: f32 = 28.0;

/// Build a face mesh with the nose at `nose` and both eyes at the given
/// pixel-space eye aspect ratio.
pub fn face(nose: Point, ear: f32, frame_w: u32, frame_h: u32) -> FaceLandmarks {
    let (w, h) = (frame_w as f32, frame_h as f32);
    let mut mesh = vec![nose; FACE_MESH_LANDMARKS];
    mesh[NOSE_IDX] = nose;

    let eye_y = nose.y * h - EYE_RISE_PX;
    // Mirrored frame: the subject's left eye appears on the right
    write_eye(&mut mesh, &LEFT_EYE_IDX, nose.x * w + EYE_SPREAD_PX, eye_y, ear, w, h);
    write_eye(&mut mesh, &RIGHT_EYE_IDX, nose.x * w - EYE_SPREAD_PX, eye_y, ear, w, h);

    FaceLandmarks(mesh)
}

fn write_eye(mesh: &mut [Point], idx: &[usize; 6], cx: f32, cy: f32, ear: f32, w: f32, h: f32) {
    let half_w = EYE_WIDTH_PX / 2.0;
    // Both vertical spans equal the eye height, so EAR = height / width
    let half_h = ear * EYE_WIDTH_PX / 2.0;
    let inner = EYE_WIDTH_PX / 6.0;

    let px = [
        (cx - half_w, cy),
        (cx - inner, cy - half_h),
        (cx + inner, cy - half_h),
        (cx + half_w, cy),
        (cx + inner, cy + half_h),
        (cx - inner, cy + half_h),
    ];
    for (slot, (x, y)) in idx.iter().zip(px) {
        mesh[*slot] = Point::new(x / w, y / h);
    }
}

/// Build a hand whose wrist sits at `wrist`. With `thumbs_up` the thumb tip is
/// raised well above the index and middle tips, otherwise it is tucked below them.
pub fn hand(wrist: Point, thumbs_up: bool) -> HandLandmarks {
    let mut points = vec![wrist; HAND_LANDMARKS];
    points[WRIST] = wrist;

    let fingers_y = wrist.y - 0.08;
    let thumb_y = if thumbs_up { wrist.y - 0.18 } else { wrist.y - 0.02 };

    points[THUMB_TIP] = Point::new(wrist.x - 0.03, thumb_y);
    points[INDEX_TIP] = Point::new(wrist.x, fingers_y);
    points[MIDDLE_TIP] = Point::new(wrist.x + 0.02, fingers_y);

    HandLandmarks(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::landmarks::eye_aspect_ratio;

    #[test]
    fn face_reproduces_requested_ear() {
        let mesh = face(Point::new(0.3, 0.5), 0.3, 640, 480);
        let left = eye_aspect_ratio(&mesh, &LEFT_EYE_IDX, 640, 480).unwrap();
        let right = eye_aspect_ratio(&mesh, &RIGHT_EYE_IDX, 640, 480).unwrap();
        assert!((left - 0.3).abs() < 1e-3);
        assert!((right - 0.3).abs() < 1e-3);
    }

    #[test]
    fn face_stays_normalized_near_centre() {
        let mesh = face(Point::new(0.5, 0.5), 0.3, 640, 480);
        assert!(mesh.0.iter().all(Point::is_normalized));
    }
}
