//! Companion
//!
//! Wires the face, modes, idle policy, touch and config into the single
//! per-frame loop body a host calls:
//!
//! ```text
//! sample_touch ──► frame: tick ──► update (render) ──► idle ──► autosave
//! ```

use serde::Serialize;
use tracing::{info, warn};

use crate::animation::{Activity, AnimationEngine, Expression};
use crate::config::{ConfigManager, ConfigStorage, DeviceConfig};
use crate::idle::{IdleAction, IdlePolicy};
use crate::mode::{DisplayMode, ModeController};
use crate::random::IntervalSampler;
use crate::render::RenderSink;
use crate::time::Millis;
use crate::touch::{TouchClassifier, TouchEvent};

/// Point-in-time view of the whole device
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompanionSnapshot {
    /// Loop timestamp of the last frame
    pub now: Millis,
    /// Current mode
    pub mode: DisplayMode,
    /// Mode before the last switch
    pub previous_mode: DisplayMode,
    /// Whether a fade is running
    pub transitioning: bool,
    /// Contrast the panel shows
    pub contrast: u8,
    /// Full brightness the controller restores to
    pub brightness: u8,
    /// Whether the idle policy dimmed the panel
    pub dimmed: bool,
    /// Face state
    pub expression: Expression,
    /// Behavior owning the face
    pub activity: Activity,
    /// Debounced pad state
    pub touching: bool,
    /// Most recent classified touch
    pub last_event: Option<TouchEvent>,
    /// Live config
    pub config: DeviceConfig,
    /// Whether config changes await autosave
    pub config_dirty: bool,
}

/// The device
pub struct Companion<S> {
    modes: ModeController,
    idle: IdlePolicy,
    touch: TouchClassifier,
    config: ConfigManager<S>,
    last_activity: Millis,
    last_event: Option<TouchEvent>,
    now: Millis,
}

impl<S: ConfigStorage> Companion<S> {
    /// Start in the persisted mode at the persisted brightness
    ///
    /// A persisted Sleep starts on the face instead.
    pub fn new(config: ConfigManager<S>, sampler: Box<dyn IntervalSampler>, now: Millis) -> Self {
        let stored = *config.config();
        let mode = match stored.last_mode {
            DisplayMode::Sleep => DisplayMode::Face,
            mode => mode,
        };
        info!(mode = %mode, brightness = stored.brightness, "Companion starting");

        let face = AnimationEngine::new(now, sampler);
        Self {
            modes: ModeController::new(face, mode, stored.brightness),
            idle: IdlePolicy::new(),
            touch: TouchClassifier::new(),
            config,
            last_activity: now,
            last_event: None,
            now,
        }
    }

    /// Feed one raw pad sample and act on any resulting event
    pub fn sample_touch(&mut self, raw: bool, now: Millis) -> Option<TouchEvent> {
        let event = self.touch.update(now, raw);
        match event {
            Some(event) => self.handle_touch(event, now),
            None if self.touch.is_touching() => self.note_activity(now),
            None => {}
        }
        event
    }

    /// Act on a classified touch
    pub fn handle_touch(&mut self, event: TouchEvent, now: Millis) {
        info!(?event, mode = %self.modes.mode(), "Touch");
        self.last_event = Some(event);
        self.note_activity(now);

        match event {
            TouchEvent::ShortPress => {
                if self.modes.mode() == DisplayMode::Sleep {
                    let target = self.idle.take_wake_target();
                    self.modes.set_mode(target, now);
                    self.config.set_last_mode(target, now);
                } else {
                    self.modes.next_mode(now);
                    self.config.set_last_mode(self.modes.mode(), now);
                    if self.modes.mode() == DisplayMode::Face {
                        self.modes.face_mut().trigger_reaction(now);
                    }
                }
            }
            TouchEvent::LongPress => {
                if self.modes.mode() == DisplayMode::Face {
                    self.modes.face_mut().trigger_reaction(now);
                }
            }
            TouchEvent::FactoryReset => self.factory_reset(now),
        }
    }

    fn note_activity(&mut self, now: Millis) {
        self.last_activity = now;
        self.idle.on_activity(self.config.config(), &mut self.modes);
    }

    fn factory_reset(&mut self, now: Millis) {
        if let Err(e) = self.config.factory_reset() {
            warn!(error = %e, "Factory reset could not clear storage");
        }
        self.idle.reset();
        let defaults = *self.config.config();
        self.modes.set_brightness(defaults.brightness);
        self.modes.set_mode(DisplayMode::Face, now);
    }

    /// Run one loop iteration
    pub fn frame(&mut self, now: Millis, sink: Option<&mut dyn RenderSink>) {
        self.now = now;
        self.modes.tick(now);
        self.modes.update(now, sink);

        let action = self
            .idle
            .update(now, self.last_activity, self.config.config(), &mut self.modes);
        if let Some(IdleAction::Slept(from)) = action {
            info!(from = %from, "Asleep");
        }

        if let Err(e) = self.config.update(now) {
            warn!(error = %e, "Autosave failed, will retry");
        }
    }

    /// Write pending config changes, for shutdown
    pub fn shutdown(&mut self) {
        if let Err(e) = self.config.flush() {
            warn!(error = %e, "Failed to flush configuration");
        }
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> CompanionSnapshot {
        let face = self.modes.face();
        CompanionSnapshot {
            now: self.now,
            mode: self.modes.mode(),
            previous_mode: self.modes.previous_mode(),
            transitioning: self.modes.is_transitioning(),
            contrast: self.modes.transition_contrast(self.now),
            brightness: self.modes.brightness(),
            dimmed: self.idle.is_dimmed(),
            expression: face.expression(),
            activity: face.activity(),
            touching: self.touch.is_touching(),
            last_event: self.last_event,
            config: *self.config.config(),
            config_dirty: self.config.is_dirty(),
        }
    }

    /// Mode controller, for feeding screen data
    pub fn modes_mut(&mut self) -> &mut ModeController {
        &mut self.modes
    }

    /// Mode controller
    #[must_use]
    pub const fn modes(&self) -> &ModeController {
        &self.modes
    }

    /// Config manager
    #[must_use]
    pub const fn config(&self) -> &ConfigManager<S> {
        &self.config
    }

    /// Timestamp of the last touch
    #[must_use]
    pub const fn last_activity(&self) -> Millis {
        self.last_activity
    }
}

impl<S> std::fmt::Debug for Companion<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Companion")
            .field("modes", &self.modes)
            .field("idle", &self.idle)
            .field("last_activity", &self.last_activity)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}
