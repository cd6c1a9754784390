//! Companion Core - Headless Face, Mode and Idle Logic for the Desk Companion
//!
//! This crate holds everything the desk companion decides, independent of
//! the panel, the touch pad and the clock source. A host (firmware, the
//! terminal simulator, tests) reads its clock once per loop, feeds touch
//! samples in, and lends a [`RenderSink`] for drawing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                            Host                               │
//! │   clock ──► now        touch pad ──► raw        RenderSink    │
//! └──────┬──────────────────────┬──────────────────────▲─────────┘
//!        │                      │                      │
//! ┌──────┴──────────────────────┴──────────────────────┴─────────┐
//! │                         Companion                             │
//! │  ┌──────────────┐  ┌──────────────────────────┐  ┌─────────┐  │
//! │  │ TouchClass.  │  │     ModeController       │  │  Idle   │  │
//! │  └──────────────┘  │ ┌──────────┐ ┌────────┐  │  │ Policy  │  │
//! │                    │ │Animation │ │Screens │  │  └─────────┘  │
//! │  ┌──────────────┐  │ │ Engine   │ │        │  │               │
//! │  │ConfigManager │  │ └──────────┘ └────────┘  │               │
//! │  └──────────────┘  └──────────────────────────┘               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Overview
//!
//! - [`animation`]: Eye/mouth state, blink, gaze, reaction and wake timing
//! - [`mode`]: Display modes and the contrast cross-fade between them
//! - [`idle`]: Dim and sleep decisions from idle time
//! - [`touch`]: Debounced press classification
//! - [`screens`]: Clock, system-info and boot pages
//! - [`config`]: Persisted device settings and the TOML settings file
//! - [`companion`]: The per-frame loop body tying it together
//! - [`render`]: The drawing surface the core writes through
//! - [`time`] / [`random`]: Wrapping millisecond clock and interval sampling
//!
//! # No I/O In The Loop
//!
//! Nothing reached from [`Companion::frame`] blocks or reads a clock. Storage
//! I/O happens only on autosave, flush and factory reset.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod companion;
pub mod config;
pub mod idle;
pub mod mode;
pub mod random;
pub mod render;
pub mod screens;
pub mod time;
pub mod touch;

// Re-exports for convenience
pub use animation::{Activity, AnimationEngine, Expression, EyeState, MouthState};
pub use companion::{Companion, CompanionSnapshot};
pub use idle::{IdleAction, IdlePolicy};
pub use mode::{DisplayMode, ModeController, TransitionState};
pub use random::{sampler_from_seed, IntervalSampler, RngSampler};
pub use render::{BitmapId, DrawCommand, FontId, RecordingSink, RenderSink};
pub use screens::{BootScreen, ClockScreen, Screen, SysInfoScreen, SystemStats};
pub use time::{Clock, ManualClock, Millis, MonotonicClock};
pub use touch::{TouchClassifier, TouchEvent};

// Config exports
pub use config::{
    ConfigError, ConfigManager, ConfigSource, ConfigStorage, DeviceConfig, FileStorage,
    MemoryStorage, RecordError,
};
