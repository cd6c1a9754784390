//! Face Expression Types

use serde::{Deserialize, Serialize};

/// What the eyes are doing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EyeState {
    /// Open, looking ahead
    #[default]
    Normal,
    /// Closed for a moment (wake phases use this as "half awake")
    Blink,
    /// Pupils to the left
    LookLeft,
    /// Pupils to the right
    LookRight,
    /// Closed, asleep
    Sleep,
}

impl EyeState {
    /// Whether this is a gaze that must auto-return to [`EyeState::Normal`]
    #[must_use]
    pub const fn is_gaze(self) -> bool {
        matches!(self, Self::LookLeft | Self::LookRight)
    }
}

/// What the mouth is doing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouthState {
    /// Resting smile
    #[default]
    Smile,
    /// Flat line
    Neutral,
    /// Round "o"
    Surprised,
    /// Two-frame talking loop
    Talking,
}

/// Complete face appearance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expression {
    /// Eye state
    pub eyes: EyeState,
    /// Mouth state
    pub mouth: MouthState,
}

impl Expression {
    /// Resting face: open eyes, smile
    pub const RESTING: Self = Self::new(EyeState::Normal, MouthState::Smile);

    /// Sleeping face: closed eyes, flat mouth
    pub const ASLEEP: Self = Self::new(EyeState::Sleep, MouthState::Neutral);

    /// Build an expression
    #[must_use]
    pub const fn new(eyes: EyeState, mouth: MouthState) -> Self {
        Self { eyes, mouth }
    }
}
