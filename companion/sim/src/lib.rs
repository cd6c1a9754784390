//! Companion Sim - Terminal stand-in for the desk companion panel
//!
//! Drives `companion-core` from one cooperative loop on the host machine.
//! The 128×64 panel is drawn into the terminal with half-block characters,
//! and the touch pad is simulated from the keyboard.
//!
//! # Architecture
//!
//! - **Canvas**: a [`RenderSink`](companion_core::RenderSink) that rasterises
//!   into a 1-bit buffer and renders it as a ratatui widget
//! - **Sprites**: illustrative art for the core's opaque bitmap ids
//! - **App**: the interactive loop (keyboard in, terminal out)
//! - **Headless**: fixed-step simulation printing JSON snapshots
//! - **Session**: storage, settings file and CLI override resolution

pub mod app;
pub mod canvas;
pub mod cli;
pub mod headless;
pub mod session;
pub mod sprites;

pub use app::App;
pub use cli::Args;
