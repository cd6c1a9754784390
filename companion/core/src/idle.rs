//! Idle Policy
//!
//! Dims the panel and then puts the companion to sleep when nobody has
//! touched it for a while. Waking is not decided here: a short press in
//! Sleep asks [`IdlePolicy::take_wake_target`] where to go.

use tracing::info;

use crate::config::DeviceConfig;
use crate::mode::{DisplayMode, ModeController};
use crate::time::{has_elapsed, secs_to_millis, Millis};

/// Dimmed brightness as a fraction of the configured level, in tenths
const DIM_TENTHS: u16 = 3;

/// Dimmed brightness for a configured level
#[must_use]
pub fn dimmed_brightness(configured: u8) -> u8 {
    u8::try_from(u16::from(configured) * DIM_TENTHS / 10).unwrap_or(configured)
}

/// What an idle check did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdleAction {
    /// Brightness lowered
    Dimmed,
    /// Switched to Sleep, remembering this mode
    Slept(DisplayMode),
}

/// Dim/sleep state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdlePolicy {
    dimmed: bool,
    before_sleep: Option<DisplayMode>,
}

impl IdlePolicy {
    /// Awake and at full brightness
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the timeouts for the time since `last_activity`
    pub fn update(
        &mut self,
        now: Millis,
        last_activity: Millis,
        config: &DeviceConfig,
        modes: &mut ModeController,
    ) -> Option<IdleAction> {
        let mode = modes.mode();
        if mode == DisplayMode::Sleep {
            return None;
        }

        if has_elapsed(now, last_activity, secs_to_millis(config.sleep_timeout_secs)) {
            info!(from = %mode, "Idle timeout, going to sleep");
            self.before_sleep = Some(mode);
            modes.set_mode(DisplayMode::Sleep, now);
            self.dimmed = true;
            return Some(IdleAction::Slept(mode));
        }

        if !self.dimmed && has_elapsed(now, last_activity, secs_to_millis(config.dim_timeout_secs))
        {
            let level = dimmed_brightness(config.brightness);
            info!(level, "Idle timeout, dimming");
            modes.set_brightness(level);
            self.dimmed = true;
            return Some(IdleAction::Dimmed);
        }

        None
    }

    /// Restore brightness after a touch; returns whether anything changed
    ///
    /// Does not leave Sleep.
    pub fn on_activity(&mut self, config: &DeviceConfig, modes: &mut ModeController) -> bool {
        if !self.dimmed {
            return false;
        }
        modes.set_brightness(config.brightness);
        self.dimmed = false;
        info!(level = config.brightness, "Brightness restored");
        true
    }

    /// Mode to restore when leaving Sleep; `Face` if none was remembered
    pub fn take_wake_target(&mut self) -> DisplayMode {
        self.before_sleep.take().unwrap_or(DisplayMode::Face)
    }

    /// Whether the panel is dimmed
    #[must_use]
    pub const fn is_dimmed(&self) -> bool {
        self.dimmed
    }

    /// Mode remembered when sleep started
    #[must_use]
    pub const fn remembered_mode(&self) -> Option<DisplayMode> {
        self.before_sleep
    }

    /// Forget everything
    pub fn reset(&mut self) {
        self.dimmed = false;
        self.before_sleep = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationEngine;
    use crate::random::RngSampler;
    use pretty_assertions::assert_eq;

    fn setup(mode: DisplayMode) -> (IdlePolicy, DeviceConfig, ModeController) {
        let config = DeviceConfig::default();
        let face = AnimationEngine::new(0, Box::new(RngSampler::seeded(1)));
        let modes = ModeController::new(face, mode, config.brightness);
        (IdlePolicy::new(), config, modes)
    }

    #[test]
    fn test_dimmed_brightness() {
        assert_eq!(dimmed_brightness(128), 38);
        assert_eq!(dimmed_brightness(255), 76);
        assert_eq!(dimmed_brightness(0), 0);
    }

    #[test]
    fn test_dims_after_dim_timeout() {
        let (mut idle, config, mut modes) = setup(DisplayMode::Face);

        assert_eq!(idle.update(29_999, 0, &config, &mut modes), None);
        assert_eq!(
            idle.update(30_000, 0, &config, &mut modes),
            Some(IdleAction::Dimmed)
        );
        assert!(idle.is_dimmed());
        assert_eq!(modes.brightness(), 38);
        assert_eq!(modes.mode(), DisplayMode::Face);

        // Only once
        assert_eq!(idle.update(31_000, 0, &config, &mut modes), None);
    }

    #[test]
    fn test_sleeps_after_sleep_timeout() {
        let (mut idle, config, mut modes) = setup(DisplayMode::Clock);
        idle.update(30_000, 0, &config, &mut modes);

        assert_eq!(
            idle.update(120_000, 0, &config, &mut modes),
            Some(IdleAction::Slept(DisplayMode::Clock))
        );
        assert_eq!(modes.mode(), DisplayMode::Sleep);
        assert_eq!(idle.remembered_mode(), Some(DisplayMode::Clock));
        assert!(idle.is_dimmed());

        assert_eq!(idle.update(500_000, 0, &config, &mut modes), None);
    }

    #[test]
    fn test_sleep_wins_when_both_due() {
        let (mut idle, config, mut modes) = setup(DisplayMode::Face);
        assert_eq!(
            idle.update(200_000, 0, &config, &mut modes),
            Some(IdleAction::Slept(DisplayMode::Face))
        );
    }

    #[test]
    fn test_activity_restores_brightness_but_not_mode() {
        let (mut idle, config, mut modes) = setup(DisplayMode::Face);
        idle.update(120_000, 0, &config, &mut modes);

        assert!(idle.on_activity(&config, &mut modes));
        assert_eq!(modes.brightness(), 128);
        assert_eq!(modes.mode(), DisplayMode::Sleep);
        assert!(!idle.on_activity(&config, &mut modes));
    }

    #[test]
    fn test_take_wake_target() {
        let (mut idle, config, mut modes) = setup(DisplayMode::SysInfo);
        assert_eq!(idle.take_wake_target(), DisplayMode::Face);

        idle.update(120_000, 0, &config, &mut modes);
        assert_eq!(idle.take_wake_target(), DisplayMode::SysInfo);
        assert_eq!(idle.take_wake_target(), DisplayMode::Face);
    }

    #[test]
    fn test_timeouts_across_clock_rollover() {
        let (mut idle, config, mut modes) = setup(DisplayMode::Face);
        let last = u32::MAX - 10_000;
        assert_eq!(idle.update(last.wrapping_add(29_000), last, &config, &mut modes), None);
        assert_eq!(
            idle.update(last.wrapping_add(30_000), last, &config, &mut modes),
            Some(IdleAction::Dimmed)
        );
    }
}
