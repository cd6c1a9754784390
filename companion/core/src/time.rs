//! Millisecond Clock
//!
//! The device exposes a free-running millisecond counter that wraps at
//! `u32::MAX` (roughly every 49.7 days). Every timer in the core is a
//! timestamp plus a threshold, and "has it elapsed" is always answered with
//! wrapping subtraction:
//!
//! ```text
//! now.wrapping_sub(since) >= threshold
//! ```
//!
//! A signed or non-wrapping comparison gets stuck forever the first time the
//! counter rolls over, so nothing in the core compares raw timestamps.

use std::time::Instant;

/// Milliseconds on the device clock (wrapping `u32`)
pub type Millis = u32;

/// Milliseconds elapsed from `since` to `now`, correct across rollover
#[inline]
#[must_use]
pub const fn elapsed(now: Millis, since: Millis) -> Millis {
    now.wrapping_sub(since)
}

/// Whether at least `threshold` ms have passed since `since`
#[inline]
#[must_use]
pub const fn has_elapsed(now: Millis, since: Millis, threshold: Millis) -> bool {
    elapsed(now, since) >= threshold
}

/// Seconds to milliseconds, saturating
#[inline]
#[must_use]
pub const fn secs_to_millis(secs: u16) -> Millis {
    (secs as Millis).saturating_mul(1000)
}

/// Source of the loop timestamp
///
/// The control loop reads this exactly once per iteration and hands the
/// value to every component, so all components agree on "now".
pub trait Clock {
    /// Current device time
    fn now(&self) -> Millis;
}

/// Clock backed by [`Instant`], truncated to a wrapping `u32`
///
/// An offset lets a host start the counter close to rollover.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
    offset: Millis,
}

impl MonotonicClock {
    /// Clock starting at zero
    #[must_use]
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Clock starting at `offset` ms
    #[must_use]
    pub fn with_offset(offset: Millis) -> Self {
        Self {
            origin: Instant::now(),
            offset,
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now(&self) -> Millis {
        // Truncation is the wrap.
        let ms = self.origin.elapsed().as_millis() as u32;
        ms.wrapping_add(self.offset)
    }
}

/// Manually advanced clock for simulations and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: Millis,
}

impl ManualClock {
    /// Clock starting at `start`
    #[must_use]
    pub const fn starting_at(start: Millis) -> Self {
        Self { now: start }
    }

    /// Advance by `ms`, wrapping
    pub fn advance(&mut self, ms: Millis) -> Millis {
        self.now = self.now.wrapping_add(ms);
        self.now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now
    }
}
