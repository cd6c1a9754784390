//! Display Modes
//!
//! [`ModeController`] owns which page is on the panel and the cross-fade
//! between pages. It is the only writer of panel contrast.
//!
//! # Transition
//!
//! ```text
//!  contrast
//!  brightness ┐                     ┌ brightness
//!             └─╲                 ╱─┘
//!                 ╲             ╱
//!                   ╲         ╱        new content drawn
//!  0                  ╲_____╱          from the midpoint
//!             T       T+D/2       T+D
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::animation::AnimationEngine;
use crate::render::RenderSink;
use crate::screens::{ClockScreen, Screen, SysInfoScreen};
use crate::time::{elapsed, Millis};

/// Length of the cross-fade between modes
pub const TRANSITION_MS: Millis = 200;

/// What the panel shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DisplayMode {
    /// Animated face
    #[default]
    Face = 0,
    /// Time and date
    Clock = 1,
    /// Memory, uptime and Wi-Fi
    SysInfo = 2,
    /// Closed eyes, entered by the idle policy
    Sleep = 3,
}

impl DisplayMode {
    /// Number of modes
    pub const COUNT: u8 = 4;

    /// Mode for a persisted index, if valid
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Face),
            1 => Some(Self::Clock),
            2 => Some(Self::SysInfo),
            3 => Some(Self::Sleep),
            _ => None,
        }
    }

    /// Mode for a persisted index; out-of-range values become `Face`
    #[must_use]
    pub const fn from_persisted(index: u8) -> Self {
        match Self::from_index(index) {
            Some(mode) => mode,
            None => Self::Face,
        }
    }

    /// Persisted index
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Next mode in the touch cycle; Sleep is never a target
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Face => Self::Clock,
            Self::Clock => Self::SysInfo,
            Self::SysInfo | Self::Sleep => Self::Face,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Face => "face",
            Self::Clock => "clock",
            Self::SysInfo => "sysinfo",
            Self::Sleep => "sleep",
        };
        f.write_str(name)
    }
}

/// Fade progress while switching modes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionState {
    /// No fade running
    #[default]
    Idle,
    /// Fade started at this timestamp
    InProgress {
        /// When the switch was requested
        started: Millis,
    },
}

/// Contrast `elapsed` ms into a fade toward `brightness`, or `None` once done
#[must_use]
pub fn fade_contrast(brightness: u8, elapsed: Millis) -> Option<u8> {
    if elapsed >= TRANSITION_MS {
        return None;
    }
    let half = TRANSITION_MS / 2;
    let distance = if elapsed < half {
        TRANSITION_MS - 2 * elapsed
    } else {
        2 * elapsed - TRANSITION_MS
    };
    let level = u32::from(brightness) * distance / TRANSITION_MS;
    Some(u8::try_from(level).unwrap_or(brightness))
}

/// Page selection, fade and contrast
pub struct ModeController {
    mode: DisplayMode,
    previous: DisplayMode,
    transition: TransitionState,
    brightness: u8,
    /// Last contrast written to a sink
    contrast: Option<u8>,
    face: AnimationEngine,
    clock: ClockScreen,
    sysinfo: SysInfoScreen,
}

impl ModeController {
    /// Controller showing `mode` with no fade
    pub fn new(face: AnimationEngine, mode: DisplayMode, brightness: u8) -> Self {
        let mut face = face;
        if mode == DisplayMode::Sleep {
            face.enter_sleep();
        }
        Self {
            mode,
            previous: mode,
            transition: TransitionState::Idle,
            brightness,
            contrast: None,
            face,
            clock: ClockScreen::new(),
            sysinfo: SysInfoScreen::new(),
        }
    }

    /// Switch to `mode`; returns `false` when already there
    ///
    /// Leaving Sleep starts the wake sequence and entering it closes the
    /// eyes. A switch during a fade restarts the fade at `now`.
    pub fn set_mode(&mut self, mode: DisplayMode, now: Millis) -> bool {
        if mode == self.mode {
            return false;
        }

        if self.mode == DisplayMode::Sleep {
            self.face.wake_up(now);
        }
        if mode == DisplayMode::Sleep {
            self.face.enter_sleep();
        }

        info!(from = %self.mode, to = %mode, "Display mode changed");
        self.previous = self.mode;
        self.mode = mode;
        self.transition = TransitionState::InProgress { started: now };
        true
    }

    /// Advance the touch cycle
    pub fn next_mode(&mut self, now: Millis) -> bool {
        self.set_mode(self.mode.next(), now)
    }

    /// Advance the face; runs in every mode
    pub fn tick(&mut self, now: Millis) {
        self.face.tick(now);
    }

    /// Resolve the fade and draw one frame
    ///
    /// With no sink the fade still advances and nothing is drawn.
    pub fn update(&mut self, now: Millis, sink: Option<&mut dyn RenderSink>) {
        let (contrast, draw) = match self.transition {
            TransitionState::InProgress { started } => {
                let t = elapsed(now, started);
                match fade_contrast(self.brightness, t) {
                    Some(level) => (level, t >= TRANSITION_MS / 2),
                    None => {
                        self.transition = TransitionState::Idle;
                        debug!(mode = %self.mode, "Transition finished");
                        (self.brightness, true)
                    }
                }
            }
            TransitionState::Idle => (self.brightness, true),
        };

        let Some(sink) = sink else {
            return;
        };

        if self.contrast != Some(contrast) {
            sink.set_contrast(contrast);
            self.contrast = Some(contrast);
        }

        if draw {
            sink.clear();
            self.render(sink);
            sink.flush();
        }
    }

    fn render(&self, sink: &mut dyn RenderSink) {
        match self.mode {
            DisplayMode::Face | DisplayMode::Sleep => self.face.render(sink),
            DisplayMode::Clock => self.clock.render(sink),
            DisplayMode::SysInfo => self.sysinfo.render(sink),
        }
    }

    /// Contrast the next update would write, without side effects
    #[must_use]
    pub fn transition_contrast(&self, now: Millis) -> u8 {
        match self.transition {
            TransitionState::InProgress { started } => {
                fade_contrast(self.brightness, elapsed(now, started)).unwrap_or(self.brightness)
            }
            TransitionState::Idle => self.brightness,
        }
    }

    /// Full brightness level; applied on the next update
    pub fn set_brightness(&mut self, level: u8) {
        if level != self.brightness {
            debug!(level, "Brightness changed");
        }
        self.brightness = level;
    }

    /// Full brightness level
    #[must_use]
    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Current mode
    #[must_use]
    pub const fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Mode before the last switch
    #[must_use]
    pub const fn previous_mode(&self) -> DisplayMode {
        self.previous
    }

    /// Fade state
    #[must_use]
    pub const fn transition(&self) -> TransitionState {
        self.transition
    }

    /// Whether a fade is running
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        matches!(self.transition, TransitionState::InProgress { .. })
    }

    /// The face
    #[must_use]
    pub const fn face(&self) -> &AnimationEngine {
        &self.face
    }

    /// The face, mutably
    pub fn face_mut(&mut self) -> &mut AnimationEngine {
        &mut self.face
    }

    /// The clock page
    pub fn clock_mut(&mut self) -> &mut ClockScreen {
        &mut self.clock
    }

    /// The status page
    pub fn sysinfo_mut(&mut self) -> &mut SysInfoScreen {
        &mut self.sysinfo
    }
}

impl fmt::Debug for ModeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeController")
            .field("mode", &self.mode)
            .field("previous", &self.previous)
            .field("transition", &self.transition)
            .field("brightness", &self.brightness)
            .field("face", &self.face)
            .finish_non_exhaustive()
    }
}
