//! Touch Classifier
//!
//! Turns raw capacitive-pad samples into press events. The host samples the
//! pad once per loop and passes the reading with the loop timestamp.

use tracing::debug;

use crate::time::{elapsed, has_elapsed, Millis};

/// Raw reading must be stable this long before it counts
pub const DEBOUNCE_MS: Millis = 50;
/// Releases shorter than this are short presses
pub const SHORT_PRESS_MAX_MS: Millis = 1_000;
/// Holds at least this long are long presses
pub const LONG_PRESS_MIN_MS: Millis = 2_000;
/// Holds at least this long request a factory reset
pub const FACTORY_RESET_MIN_MS: Millis = 10_000;

/// Classified touch
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum TouchEvent {
    /// Tap, reported on release
    ShortPress,
    /// Hold, reported while still held
    LongPress,
    /// Very long hold, reported while still held
    FactoryReset,
}

/// Debounce and press-duration state machine
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TouchClassifier {
    last_raw: bool,
    raw_changed_at: Millis,
    debounced: bool,
    pressed_at: Option<Millis>,
    long_fired: bool,
    reset_fired: bool,
}

impl TouchClassifier {
    /// Classifier with the pad released
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw sample
    pub fn update(&mut self, now: Millis, raw: bool) -> Option<TouchEvent> {
        if raw != self.last_raw {
            self.last_raw = raw;
            self.raw_changed_at = now;
        }

        if raw != self.debounced && has_elapsed(now, self.raw_changed_at, DEBOUNCE_MS) {
            self.debounced = raw;
            if raw {
                self.pressed_at = Some(now);
                self.long_fired = false;
                self.reset_fired = false;
            } else {
                let held = self.pressed_at.take().map(|start| elapsed(now, start));
                debug!(?held, "Touch released");
                if let Some(held) = held {
                    if !self.long_fired && !self.reset_fired && held < SHORT_PRESS_MAX_MS {
                        return Some(TouchEvent::ShortPress);
                    }
                }
                return None;
            }
        }

        let held = self.press_duration(now);
        if self.debounced && !self.reset_fired && held >= FACTORY_RESET_MIN_MS {
            self.reset_fired = true;
            self.long_fired = true;
            return Some(TouchEvent::FactoryReset);
        }
        if self.debounced && !self.long_fired && held >= LONG_PRESS_MIN_MS {
            self.long_fired = true;
            return Some(TouchEvent::LongPress);
        }

        None
    }

    /// Debounced pad state
    #[must_use]
    pub const fn is_touching(&self) -> bool {
        self.debounced
    }

    /// How long the current press has been held; 0 when released
    #[must_use]
    pub fn press_duration(&self, now: Millis) -> Millis {
        match self.pressed_at {
            Some(start) if self.debounced => elapsed(now, start),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Hold the pad at `raw` from `from` to `to` in 10 ms steps
    fn drive(
        touch: &mut TouchClassifier,
        from: Millis,
        to: Millis,
        raw: bool,
    ) -> Vec<(Millis, TouchEvent)> {
        (from..to)
            .step_by(10)
            .filter_map(|now| touch.update(now, raw).map(|e| (now, e)))
            .collect()
    }

    #[test]
    fn test_short_press() {
        let mut touch = TouchClassifier::new();
        assert!(drive(&mut touch, 0, 300, true).is_empty());
        assert!(touch.is_touching());
        assert_eq!(
            drive(&mut touch, 300, 500, false),
            vec![(350, TouchEvent::ShortPress)]
        );
        assert!(!touch.is_touching());
    }

    #[test]
    fn test_bounce_is_filtered() {
        let mut touch = TouchClassifier::new();
        for (i, now) in (0..40).step_by(5).enumerate() {
            assert_eq!(touch.update(now, i % 2 == 0), None);
        }
        assert!(!touch.is_touching());

        // A burst of chatter followed by a stable press is one press
        let events: Vec<_> = drive(&mut touch, 40, 400, true)
            .into_iter()
            .chain(drive(&mut touch, 400, 600, false))
            .collect();
        assert_eq!(events, vec![(450, TouchEvent::ShortPress)]);
    }

    #[test]
    fn test_medium_hold_is_ignored() {
        let mut touch = TouchClassifier::new();
        drive(&mut touch, 0, 1_500, true);
        assert!(drive(&mut touch, 1_500, 1_700, false).is_empty());
    }

    #[test]
    fn test_long_press_fires_once_while_held() {
        let mut touch = TouchClassifier::new();
        let events = drive(&mut touch, 0, 5_000, true);
        assert_eq!(events, vec![(2_050, TouchEvent::LongPress)]);
        assert_eq!(touch.press_duration(5_000), 4_950);

        // No short press on release
        assert!(drive(&mut touch, 5_000, 5_200, false).is_empty());
        assert_eq!(touch.press_duration(5_200), 0);
    }

    #[test]
    fn test_factory_reset_fires_once() {
        let mut touch = TouchClassifier::new();
        let events = drive(&mut touch, 0, 15_000, true);
        assert_eq!(
            events,
            vec![
                (2_050, TouchEvent::LongPress),
                (10_050, TouchEvent::FactoryReset)
            ]
        );
        assert!(drive(&mut touch, 15_000, 15_200, false).is_empty());
    }

    #[test]
    fn test_factory_reset_suppresses_long_press_on_coarse_sampling() {
        let mut touch = TouchClassifier::new();
        touch.update(0, true);
        touch.update(50, true);
        assert_eq!(touch.update(11_000, true), Some(TouchEvent::FactoryReset));
        assert_eq!(touch.update(11_010, true), None);
    }

    #[test]
    fn test_press_across_clock_rollover() {
        let mut touch = TouchClassifier::new();
        let start = u32::MAX - 100;
        touch.update(start, true);
        touch.update(start.wrapping_add(60), true);
        assert!(touch.is_touching());
        touch.update(start.wrapping_add(300), false);
        assert_eq!(
            touch.update(start.wrapping_add(360), false),
            Some(TouchEvent::ShortPress)
        );
    }
}
