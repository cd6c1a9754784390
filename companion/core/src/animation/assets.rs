//! Face Asset Tables
//!
//! Bitmap selection is a lookup, not a branch: each eye state, blink frame
//! and mouth state maps to an opaque [`BitmapId`]. The display driver owns
//! what the ids look like.
//!
//! Selection order for the eyes is fixed: Sleep always wins, then an
//! in-flight blink frame, then the eye state itself.

use super::expression::{EyeState, MouthState};
use crate::render::BitmapId;
use crate::time::Millis;

/// Eye: open, looking ahead
pub const EYE_OPEN: BitmapId = BitmapId(0x0100);
/// Eye: first closing frame
pub const EYE_HALF: BitmapId = BitmapId(0x0101);
/// Eye: nearly closed
pub const EYE_SQUINT: BitmapId = BitmapId(0x0102);
/// Eye: closed
pub const EYE_CLOSED: BitmapId = BitmapId(0x0103);
/// Eye: pupil left
pub const EYE_LEFT: BitmapId = BitmapId(0x0104);
/// Eye: pupil right
pub const EYE_RIGHT: BitmapId = BitmapId(0x0105);

/// Mouth: smile
pub const MOUTH_SMILE: BitmapId = BitmapId(0x0200);
/// Mouth: flat
pub const MOUTH_NEUTRAL: BitmapId = BitmapId(0x0201);
/// Mouth: round
pub const MOUTH_SURPRISED: BitmapId = BitmapId(0x0202);
/// Mouth: talking, small opening
pub const MOUTH_TALK_A: BitmapId = BitmapId(0x0203);
/// Mouth: talking, wide opening
pub const MOUTH_TALK_B: BitmapId = BitmapId(0x0204);

/// Small face icon used by the clock screen
pub const MINI_FACE: BitmapId = BitmapId(0x0300);

/// Eye bitmap size
pub const EYE_SIZE: (u16, u16) = (16, 16);
/// Mouth bitmap size
pub const MOUTH_SIZE: (u16, u16) = (32, 16);
/// Mini face icon size
pub const MINI_FACE_SIZE: (u16, u16) = (16, 16);

/// How long each talking frame is held
pub const TALK_FRAME_MS: Millis = 200;

/// Blink frames: close, close more, shut, open, open more
pub const BLINK_FRAMES: [BitmapId; 5] = [EYE_HALF, EYE_SQUINT, EYE_CLOSED, EYE_SQUINT, EYE_HALF];

const EYE_TABLE: [(EyeState, BitmapId); 5] = [
    (EyeState::Normal, EYE_OPEN),
    (EyeState::Blink, EYE_CLOSED),
    (EyeState::LookLeft, EYE_LEFT),
    (EyeState::LookRight, EYE_RIGHT),
    (EyeState::Sleep, EYE_CLOSED),
];

const MOUTH_TABLE: [(MouthState, &[BitmapId]); 4] = [
    (MouthState::Smile, &[MOUTH_SMILE]),
    (MouthState::Neutral, &[MOUTH_NEUTRAL]),
    (MouthState::Surprised, &[MOUTH_SURPRISED]),
    (MouthState::Talking, &[MOUTH_TALK_A, MOUTH_TALK_B]),
];

/// Eye bitmap for a state and optional blink frame
#[must_use]
pub fn eye_bitmap(eyes: EyeState, blink_phase: Option<u8>) -> BitmapId {
    if eyes == EyeState::Sleep {
        return EYE_CLOSED;
    }
    if let Some(frame) = blink_phase.and_then(|p| BLINK_FRAMES.get(usize::from(p))) {
        return *frame;
    }
    EYE_TABLE
        .iter()
        .find(|(state, _)| *state == eyes)
        .map_or(EYE_OPEN, |(_, id)| *id)
}

/// Mouth bitmap for a state at time `now`
#[must_use]
pub fn mouth_bitmap(mouth: MouthState, now: Millis) -> BitmapId {
    let frames = MOUTH_TABLE
        .iter()
        .find(|(state, _)| *state == mouth)
        .map_or(&[MOUTH_SMILE][..], |(_, frames)| *frames);
    let index = (now / TALK_FRAME_MS) as usize % frames.len();
    frames[index]
}

/// Where the face parts sit on the panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceLayout {
    /// Left eye top-left corner
    pub left_eye: (i16, i16),
    /// Right eye top-left corner
    pub right_eye: (i16, i16),
    /// Mouth top-left corner
    pub mouth: (i16, i16),
}

impl Default for FaceLayout {
    fn default() -> Self {
        Self {
            left_eye: (24, 8),
            right_eye: (88, 8),
            mouth: (48, 40),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_wins_over_stale_blink() {
        assert_eq!(eye_bitmap(EyeState::Sleep, Some(0)), EYE_CLOSED);
        assert_eq!(eye_bitmap(EyeState::Sleep, None), EYE_CLOSED);
    }

    #[test]
    fn test_blink_frames_override_gaze() {
        assert_eq!(eye_bitmap(EyeState::LookLeft, Some(2)), EYE_CLOSED);
        assert_eq!(eye_bitmap(EyeState::Normal, Some(0)), EYE_HALF);
        assert_eq!(eye_bitmap(EyeState::Normal, Some(4)), EYE_HALF);
    }

    #[test]
    fn test_out_of_range_blink_frame_falls_back_to_state() {
        assert_eq!(eye_bitmap(EyeState::LookRight, Some(9)), EYE_RIGHT);
    }

    #[test]
    fn test_every_eye_state_has_a_bitmap() {
        assert_eq!(eye_bitmap(EyeState::Normal, None), EYE_OPEN);
        assert_eq!(eye_bitmap(EyeState::Blink, None), EYE_CLOSED);
        assert_eq!(eye_bitmap(EyeState::LookLeft, None), EYE_LEFT);
        assert_eq!(eye_bitmap(EyeState::LookRight, None), EYE_RIGHT);
    }

    #[test]
    fn test_talking_alternates() {
        assert_eq!(mouth_bitmap(MouthState::Talking, 0), MOUTH_TALK_A);
        assert_eq!(mouth_bitmap(MouthState::Talking, 199), MOUTH_TALK_A);
        assert_eq!(mouth_bitmap(MouthState::Talking, 200), MOUTH_TALK_B);
        assert_eq!(mouth_bitmap(MouthState::Talking, 400), MOUTH_TALK_A);
        assert_eq!(mouth_bitmap(MouthState::Smile, 200), MOUTH_SMILE);
    }
}
