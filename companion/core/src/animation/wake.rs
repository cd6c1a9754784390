//! Wake Sequence
//!
//! The stretch-and-yawn played when the face leaves sleep. The phase table is
//! data: adding a phase means adding a row.

use super::expression::{Expression, EyeState, MouthState};
use crate::time::{elapsed, Millis};

/// One step of the wake animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WakePhase {
    /// How long this step is shown
    pub duration_ms: Millis,
    /// Face shown during this step
    pub expression: Expression,
}

impl WakePhase {
    const fn new(duration_ms: Millis, eyes: EyeState, mouth: MouthState) -> Self {
        Self {
            duration_ms,
            expression: Expression::new(eyes, mouth),
        }
    }
}

/// Eyes half open, yawn, stretch with eyes shut, settle
pub static WAKE_PHASES: [WakePhase; 4] = [
    WakePhase::new(300, EyeState::Blink, MouthState::Neutral),
    WakePhase::new(300, EyeState::Normal, MouthState::Surprised),
    WakePhase::new(400, EyeState::Blink, MouthState::Talking),
    WakePhase::new(500, EyeState::Normal, MouthState::Smile),
];

/// Where a running sequence is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeProgress {
    /// Still playing; show this face
    Playing(Expression),
    /// Last phase has elapsed
    Finished,
}

/// Wake animation state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WakeSequence {
    phases: &'static [WakePhase],
    started: Option<Millis>,
}

impl WakeSequence {
    /// Sequence over the standard phase table
    #[must_use]
    pub fn new() -> Self {
        Self::with_phases(&WAKE_PHASES)
    }

    /// Sequence over a custom phase table
    #[must_use]
    pub const fn with_phases(phases: &'static [WakePhase]) -> Self {
        Self {
            phases,
            started: None,
        }
    }

    /// Arm the sequence; a running sequence is left alone
    pub fn start(&mut self, now: Millis) -> bool {
        if self.started.is_some() {
            return false;
        }
        self.started = Some(now);
        true
    }

    /// Stop without finishing
    pub fn cancel(&mut self) {
        self.started = None;
    }

    /// Whether the sequence is playing
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.started.is_some()
    }

    /// Total length of the phase table
    #[must_use]
    pub fn total_duration(&self) -> Millis {
        self.phases.iter().map(|p| p.duration_ms).sum()
    }

    /// Face for a point `offset` ms into the sequence
    #[must_use]
    pub fn expression_at(&self, offset: Millis) -> Option<Expression> {
        let mut end = 0;
        for phase in self.phases {
            end += phase.duration_ms;
            if offset < end {
                return Some(phase.expression);
            }
        }
        None
    }

    /// Advance a running sequence; finishing disarms it
    pub fn advance(&mut self, now: Millis) -> Option<WakeProgress> {
        let start = self.started?;
        match self.expression_at(elapsed(now, start)) {
            Some(expression) => Some(WakeProgress::Playing(expression)),
            None => {
                self.started = None;
                Some(WakeProgress::Finished)
            }
        }
    }
}

impl Default for WakeSequence {
    fn default() -> Self {
        Self::new()
    }
}
