//! Animation Timers
//!
//! Each self-timed behavior of the face is a small deadline tracker. None of
//! them know about each other; [`super::AnimationEngine`] decides which one
//! runs on a given tick.

use std::ops::RangeInclusive;

use crate::random::IntervalSampler;
use crate::time::{elapsed, has_elapsed, Millis};

/// Shortest gap between blinks
pub const BLINK_INTERVAL_MIN_MS: Millis = 3_000;
/// Longest gap between blinks
pub const BLINK_INTERVAL_MAX_MS: Millis = 8_000;
/// Frames in one blink (closing, closed, opening)
pub const BLINK_PHASES: u8 = 5;
/// Duration of one blink frame
pub const BLINK_PHASE_MS: Millis = 30;
/// Duration of a whole blink
pub const BLINK_DURATION_MS: Millis = BLINK_PHASE_MS * BLINK_PHASES as Millis;

/// Shortest gap between glances
pub const LOOK_INTERVAL_MIN_MS: Millis = 8_000;
/// Longest gap between glances
pub const LOOK_INTERVAL_MAX_MS: Millis = 14_999;
/// How long a glance is held before the eyes return
pub const LOOK_DWELL_MS: Millis = 1_000;

/// Length of the touch reaction
pub const REACTION_MS: Millis = 500;

/// Blink interval range, both ends inclusive
pub const BLINK_INTERVAL: RangeInclusive<Millis> = BLINK_INTERVAL_MIN_MS..=BLINK_INTERVAL_MAX_MS;
/// Glance interval range, both ends inclusive
pub const LOOK_INTERVAL: RangeInclusive<Millis> = LOOK_INTERVAL_MIN_MS..=LOOK_INTERVAL_MAX_MS;

/// Draw a fresh blink interval
pub fn next_blink_interval(sampler: &mut dyn IntervalSampler) -> Millis {
    sampler.sample(BLINK_INTERVAL)
}

/// Idle blink scheduler and in-flight blink progress
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlinkTimer {
    last_blink: Millis,
    interval: Millis,
    started: Option<Millis>,
    phase: u8,
}

impl BlinkTimer {
    /// Scheduler whose first blink is one fresh interval after `now`
    pub fn new(now: Millis, sampler: &mut dyn IntervalSampler) -> Self {
        Self {
            last_blink: now,
            interval: next_blink_interval(sampler),
            started: None,
            phase: 0,
        }
    }

    /// Abandon any blink and schedule the next one from `now`
    pub fn reseed(&mut self, now: Millis, sampler: &mut dyn IntervalSampler) {
        self.last_blink = now;
        self.interval = next_blink_interval(sampler);
        self.started = None;
        self.phase = 0;
    }

    /// Drop an in-flight blink without touching the schedule
    pub fn cancel(&mut self) {
        self.started = None;
        self.phase = 0;
    }

    /// Whether a blink is in flight
    #[must_use]
    pub const fn is_blinking(&self) -> bool {
        self.started.is_some()
    }

    /// Current blink frame (0..[`BLINK_PHASES`]) while blinking
    #[must_use]
    pub fn phase(&self) -> Option<u8> {
        self.started.map(|_| self.phase)
    }

    /// Interval currently being waited out
    #[must_use]
    pub const fn interval(&self) -> Millis {
        self.interval
    }

    /// Advance the blink machine; returns whether a blink is in flight
    pub fn advance(&mut self, now: Millis, sampler: &mut dyn IntervalSampler) -> bool {
        match self.started {
            Some(start) => {
                let t = elapsed(now, start);
                if t >= BLINK_DURATION_MS {
                    self.reseed(now, sampler);
                    false
                } else {
                    #[allow(clippy::cast_possible_truncation)]
                    let frame = (t / BLINK_PHASE_MS) as u8;
                    self.phase = self.phase.max(frame.min(BLINK_PHASES - 1));
                    true
                }
            }
            None => {
                if has_elapsed(now, self.last_blink, self.interval) {
                    self.started = Some(now);
                    self.phase = 0;
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// What the gaze machine wants the eyes to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GazeChange {
    /// Start a glance to the left
    LookLeft,
    /// Start a glance to the right
    LookRight,
    /// Dwell is over, look ahead again
    Return,
}

/// Idle glance scheduler
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookTimer {
    last_look: Millis,
    interval: Millis,
}

impl LookTimer {
    /// Scheduler whose first glance is one fresh interval after `now`
    pub fn new(now: Millis, sampler: &mut dyn IntervalSampler) -> Self {
        Self {
            last_look: now,
            interval: sampler.sample(LOOK_INTERVAL),
        }
    }

    /// Schedule the next glance from `now`
    pub fn reseed(&mut self, now: Millis, sampler: &mut dyn IntervalSampler) {
        self.last_look = now;
        self.interval = sampler.sample(LOOK_INTERVAL);
    }

    /// Anchor the dwell of an externally requested glance at `now`
    pub fn mark(&mut self, now: Millis) {
        self.last_look = now;
    }

    /// Interval currently being waited out
    #[must_use]
    pub const fn interval(&self) -> Millis {
        self.interval
    }

    /// Advance the gaze machine given whether the eyes are mid-glance
    pub fn advance(
        &mut self,
        now: Millis,
        glancing: bool,
        sampler: &mut dyn IntervalSampler,
    ) -> Option<GazeChange> {
        if glancing {
            if has_elapsed(now, self.last_look, LOOK_DWELL_MS) {
                self.reseed(now, sampler);
                return Some(GazeChange::Return);
            }
            return None;
        }

        if has_elapsed(now, self.last_look, self.interval) {
            self.last_look = now;
            return Some(if sampler.coin() {
                GazeChange::LookLeft
            } else {
                GazeChange::LookRight
            });
        }

        None
    }
}

/// One-shot touch reaction window
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReactionTimer {
    started: Option<Millis>,
}

impl ReactionTimer {
    /// Open the window; returns `false` if one is already open
    pub fn start(&mut self, now: Millis) -> bool {
        if self.started.is_some() {
            return false;
        }
        self.started = Some(now);
        true
    }

    /// Whether the window is open
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.started.is_some()
    }

    /// Whether the open window has run its course
    #[must_use]
    pub fn is_expired(&self, now: Millis) -> bool {
        self.started
            .is_some_and(|start| has_elapsed(now, start, REACTION_MS))
    }

    /// Close the window
    pub fn clear(&mut self) {
        self.started = None;
    }
}
