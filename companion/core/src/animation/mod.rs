//! Face Animation Engine
//!
//! Owns the eye/mouth state and every self-timed face behavior: idle blink,
//! idle glances, the touch reaction, sleep and the wake sequence.
//!
//! # Priority
//!
//! Each tick resolves exactly one behavior, highest first:
//!
//! ```text
//! wake sequence ──► asleep (frozen) ──► reaction ──► blink ──► gaze
//! ```
//!
//! Wake and reaction requests preempt a blink in flight, so at most one of
//! {waking, reacting, blinking} is ever active.
//!
//! # Time
//!
//! The engine never reads a clock. Every entry point that needs time takes
//! the loop timestamp, and `render` draws from the timestamp of the last
//! tick.

pub mod assets;
mod expression;
pub mod timers;
mod wake;

use tracing::debug;

pub use assets::FaceLayout;
pub use expression::{Expression, EyeState, MouthState};
pub use timers::{BlinkTimer, GazeChange, LookTimer, ReactionTimer};
pub use wake::{WakePhase, WakeProgress, WakeSequence, WAKE_PHASES};

use crate::random::IntervalSampler;
use crate::render::RenderSink;
use crate::time::Millis;

/// Which timed behavior currently owns the face
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Activity {
    /// No timed behavior; blink and gaze schedulers are counting down
    Idle,
    /// A blink is in flight
    Blinking,
    /// The touch reaction window is open
    Reacting,
    /// The wake sequence is playing
    WakingUp,
    /// Asleep; nothing advances
    Sleeping,
}

/// The face
pub struct AnimationEngine {
    expression: Expression,
    blink: BlinkTimer,
    look: LookTimer,
    reaction: ReactionTimer,
    wake: WakeSequence,
    sampler: Box<dyn IntervalSampler>,
    layout: FaceLayout,
    /// Timestamp of the last tick, used by `render`
    now: Millis,
}

impl AnimationEngine {
    /// Resting face with blink and gaze scheduled from `now`
    pub fn new(now: Millis, mut sampler: Box<dyn IntervalSampler>) -> Self {
        let blink = BlinkTimer::new(now, sampler.as_mut());
        let look = LookTimer::new(now, sampler.as_mut());
        Self {
            expression: Expression::RESTING,
            blink,
            look,
            reaction: ReactionTimer::default(),
            wake: WakeSequence::new(),
            sampler,
            layout: FaceLayout::default(),
            now,
        }
    }

    /// Replace the face layout
    #[must_use]
    pub fn with_layout(mut self, layout: FaceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Advance all timers to `now` and resolve the face
    pub fn tick(&mut self, now: Millis) {
        self.now = now;

        if let Some(progress) = self.wake.advance(now) {
            match progress {
                WakeProgress::Playing(expression) => self.expression = expression,
                WakeProgress::Finished => {
                    self.expression = Expression::RESTING;
                    self.blink.reseed(now, self.sampler.as_mut());
                    self.look.reseed(now, self.sampler.as_mut());
                    debug!("Wake sequence finished");
                }
            }
            return;
        }

        if self.is_asleep() {
            return;
        }

        if self.reaction.is_active() {
            if self.reaction.is_expired(now) {
                self.reaction.clear();
                self.expression.mouth = MouthState::Smile;
                self.blink.reseed(now, self.sampler.as_mut());
            }
            return;
        }

        if self.blink.advance(now, self.sampler.as_mut()) {
            return;
        }

        let glancing = self.expression.eyes.is_gaze();
        match self.look.advance(now, glancing, self.sampler.as_mut()) {
            Some(GazeChange::LookLeft) => self.expression.eyes = EyeState::LookLeft,
            Some(GazeChange::LookRight) => self.expression.eyes = EyeState::LookRight,
            Some(GazeChange::Return) => self.expression.eyes = EyeState::Normal,
            None => {}
        }
    }

    /// Draw the face; reads state only
    pub fn render(&self, sink: &mut dyn RenderSink) {
        let eye = assets::eye_bitmap(self.expression.eyes, self.blink.phase());
        let (ew, eh) = assets::EYE_SIZE;
        let (lx, ly) = self.layout.left_eye;
        let (rx, ry) = self.layout.right_eye;
        sink.draw_bitmap(lx, ly, ew, eh, eye);
        sink.draw_bitmap(rx, ry, ew, eh, eye);

        let mouth = assets::mouth_bitmap(self.expression.mouth, self.now);
        let (mw, mh) = assets::MOUTH_SIZE;
        let (mx, my) = self.layout.mouth;
        sink.draw_bitmap(mx, my, mw, mh, mouth);
    }

    /// Set the face directly
    ///
    /// Ignored while asleep. Sleep eyes cannot be requested this way and
    /// degrade to open eyes; use [`Self::enter_sleep`]. A glance requested
    /// mid-blink keeps the current eyes, and the mouth stays surprised until
    /// a running reaction ends in a smile.
    pub fn set_expression(&mut self, expression: Expression, now: Millis) {
        if self.is_asleep() {
            debug!(?expression, "Ignoring expression while asleep");
            return;
        }

        let mut expression = expression;
        if expression.eyes == EyeState::Sleep {
            debug!("Sleep eyes requested via set_expression, using Normal");
            expression.eyes = EyeState::Normal;
        }
        if expression.eyes.is_gaze() {
            if self.blink.is_blinking() {
                debug!(eyes = ?expression.eyes, "Ignoring glance during blink");
                expression.eyes = self.expression.eyes;
            } else {
                self.look.mark(now);
            }
        }
        if self.reaction.is_active() {
            expression.mouth = self.expression.mouth;
        }
        self.expression = expression;
    }

    /// Surprised mouth for 500 ms
    ///
    /// Ignored while asleep, waking, or already reacting. Preempts a blink;
    /// the next one is scheduled a fresh interval after the reaction ends.
    pub fn trigger_reaction(&mut self, now: Millis) -> bool {
        if self.is_asleep() || self.wake.is_active() {
            return false;
        }
        if !self.reaction.start(now) {
            return false;
        }
        self.blink.cancel();
        self.expression.mouth = MouthState::Surprised;
        debug!(now, "Reaction started");
        true
    }

    /// Close the eyes and stop all timed behavior
    pub fn enter_sleep(&mut self) {
        self.blink.cancel();
        self.reaction.clear();
        self.wake.cancel();
        self.expression = Expression::ASLEEP;
        debug!("Face asleep");
    }

    /// Start the wake sequence; a running sequence is left alone
    pub fn wake_up(&mut self, now: Millis) -> bool {
        if !self.wake.start(now) {
            return false;
        }
        self.blink.cancel();
        self.reaction.clear();
        debug!(now, "Wake sequence started");
        true
    }

    /// Current face
    #[must_use]
    pub const fn expression(&self) -> Expression {
        self.expression
    }

    /// Which behavior owns the face
    #[must_use]
    pub fn activity(&self) -> Activity {
        if self.wake.is_active() {
            Activity::WakingUp
        } else if self.is_asleep() {
            Activity::Sleeping
        } else if self.reaction.is_active() {
            Activity::Reacting
        } else if self.blink.is_blinking() {
            Activity::Blinking
        } else {
            Activity::Idle
        }
    }

    /// Asleep with no wake in flight
    #[must_use]
    pub fn is_asleep(&self) -> bool {
        self.expression.eyes == EyeState::Sleep && !self.wake.is_active()
    }

    /// Whether the wake sequence is playing
    #[must_use]
    pub const fn is_waking(&self) -> bool {
        self.wake.is_active()
    }

    /// Whether the reaction window is open
    #[must_use]
    pub const fn is_reacting(&self) -> bool {
        self.reaction.is_active()
    }

    /// Whether a blink is in flight
    #[must_use]
    pub const fn is_blinking(&self) -> bool {
        self.blink.is_blinking()
    }

    /// Blink frame while blinking
    #[must_use]
    pub fn blink_phase(&self) -> Option<u8> {
        self.blink.phase()
    }
}

impl std::fmt::Debug for AnimationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationEngine")
            .field("expression", &self.expression)
            .field("activity", &self.activity())
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}
