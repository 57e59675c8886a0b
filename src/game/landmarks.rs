//! Landmark interpretation: raw normalized geometry to semantic signals

use crate::perception::{
    FaceLandmarks, HandLandmarks, Point, INDEX_TIP, MIDDLE_TIP, THUMB_TIP, WRIST,
};

/// Horizontal eye spans at or below this many pixels carry no signal
const MIN_EYE_WIDTH_PX: f32 = 1e-3;

/// Recognised hand gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    ThumbsUp,
    None,
}

fn to_pixels(p: Point, frame_w: u32, frame_h: u32) -> (f32, f32) {
    (p.x * frame_w as f32, p.y * frame_h as f32)
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Eye aspect ratio over a six-point contour
/// (outer corner, two upper, inner corner, two lower), measured in pixels.
///
/// Returns `None` when an index is missing or the eye has no horizontal extent.
pub fn eye_aspect_ratio(
    face: &FaceLandmarks,
    eye: &[usize; 6],
    frame_w: u32,
    frame_h: u32,
) -> Option<f32> {
    let mut p = [(0.0, 0.0); 6];
    for (dst, &idx) in p.iter_mut().zip(eye) {
        *dst = to_pixels(face.get(idx)?, frame_w, frame_h);
    }

    let vertical_a = distance(p[1], p[5]);
    let vertical_b = distance(p[2], p[4]);
    let horizontal = distance(p[0], p[3]);

    if !(horizontal > MIN_EYE_WIDTH_PX) {
        return None;
    }
    let ear = (vertical_a + vertical_b) / (2.0 * horizontal);
    ear.is_finite().then_some(ear)
}

/// Mean EAR of both eyes; `None` if either eye gives no signal
pub fn average_ear(
    face: &FaceLandmarks,
    left_eye: &[usize; 6],
    right_eye: &[usize; 6],
    frame_w: u32,
    frame_h: u32,
) -> Option<f32> {
    let left = eye_aspect_ratio(face, left_eye, frame_w, frame_h)?;
    let right = eye_aspect_ratio(face, right_eye, frame_w, frame_h)?;
    Some((left + right) / 2.0)
}

/// Thumbs-up iff the thumb tip sits above both the index and middle tips by `margin`
pub fn classify_hand_gesture(hand: &HandLandmarks, margin: f32) -> Gesture {
    let (Some(thumb), Some(index), Some(middle)) =
        (hand.get(THUMB_TIP), hand.get(INDEX_TIP), hand.get(MIDDLE_TIP))
    else {
        return Gesture::None;
    };

    if thumb.y + margin <= index.y && thumb.y + margin <= middle.y {
        Gesture::ThumbsUp
    } else {
        Gesture::None
    }
}

/// Nose landmark in pixel coordinates
pub fn avatar_anchor(
    face: &FaceLandmarks,
    nose_index: usize,
    frame_w: u32,
    frame_h: u32,
) -> Option<(f32, f32)> {
    face.get(nose_index).map(|nose| to_pixels(nose, frame_w, frame_h))
}

/// A face is usable only if every landmark the engine reads is present and normalized
pub fn face_is_valid(face: &FaceLandmarks, indices: impl IntoIterator<Item = usize>) -> bool {
    indices
        .into_iter()
        .all(|idx| face.get(idx).is_some_and(|p| p.is_normalized()))
}

/// Same rule for hands, over the wrist and the three tips the classifier reads
pub fn hand_is_valid(hand: &HandLandmarks) -> bool {
    [WRIST, THUMB_TIP, INDEX_TIP, MIDDLE_TIP]
        .into_iter()
        .all(|idx| hand.get(idx).is_some_and(|p| p.is_normalized()))
}
