//! Interactive Loop
//!
//! One cooperative loop per frame:
//!
//! ```text
//! poll keys ──► read clock once ──► pad sample ──► Companion::frame ──► draw
//! ```
//!
//! Terminals do not report key releases, so each key holds the simulated pad
//! down for a fixed time and the core's classifier sees a real press. Waiting
//! on input is the loop's only pause.

use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use tracing::{debug, info};

use companion_core::render::PANEL_WIDTH;
use companion_core::time::{elapsed, has_elapsed};
use companion_core::{
    BootScreen, Clock, CompanionSnapshot, Millis, MonotonicClock, RenderSink, Screen, SystemStats,
};

use crate::canvas::{PanelCanvas, PANEL_ROWS};
use crate::cli::Args;
use crate::session::{open_storage, start_companion, SimCompanion};

/// Longest wait for a key before running the next frame
const INPUT_POLL: Duration = Duration::from_millis(16);

/// How long the boot splash stays up
pub const BOOT_MS: Millis = 1_500;

/// Pad hold for a tap
pub const TAP_HOLD_MS: Millis = 150;
/// Pad hold for a long press
pub const LONG_HOLD_MS: Millis = 2_200;
/// Pad hold for a factory reset
pub const RESET_HOLD_MS: Millis = 10_200;

const HELP: &str = " space tap | l long press | r factory reset (hold 10s) | q quit";

/// Signal levels the fake Wi-Fi cycles through
const RSSI_STEPS: [i8; 5] = [-48, -57, -66, -75, -86];

/// Readings for the status page, derived from uptime
pub fn simulated_stats(uptime: Millis) -> SystemStats {
    let secs = uptime / 1_000;
    let step = usize::try_from(secs / 10).unwrap_or(0) % RSSI_STEPS.len();
    SystemStats {
        free_heap_bytes: 180 * 1024 + (secs % 32) * 1024,
        uptime_secs: secs,
        wifi_rssi: Some(RSSI_STEPS[step]),
    }
}

#[derive(Clone, Copy, Debug)]
struct HeldPress {
    started: Millis,
    hold: Millis,
}

/// Interactive simulator state
pub struct App {
    companion: SimCompanion,
    canvas: PanelCanvas,
    started: Millis,
    booting: bool,
    press: Option<HeldPress>,
    running: bool,
}

impl App {
    /// Open storage, resolve settings and show the boot splash
    pub fn new(args: &Args) -> anyhow::Result<(Self, MonotonicClock)> {
        let clock = MonotonicClock::with_offset(args.start_millis());
        let started = clock.now();
        let storage = open_storage(args)?;
        let companion = start_companion(args, storage, started)?;
        Ok((Self::with_companion(companion, started), clock))
    }

    /// Wrap an already built companion started at `started`
    pub fn with_companion(companion: SimCompanion, started: Millis) -> Self {
        let mut canvas = PanelCanvas::new();
        canvas.set_contrast(companion.modes().brightness());
        canvas.clear();
        BootScreen.render(&mut canvas);
        canvas.flush();

        Self {
            companion,
            canvas,
            started,
            booting: true,
            press: None,
            running: true,
        }
    }

    /// Main loop
    pub fn run<B: Backend, C: Clock>(
        &mut self,
        terminal: &mut Terminal<B>,
        clock: &C,
    ) -> anyhow::Result<()> {
        info!("Simulator running");
        while self.running {
            let key = if event::poll(INPUT_POLL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => Some(key),
                    _ => None,
                }
            } else {
                None
            };

            let now = clock.now();
            if let Some(key) = key {
                self.handle_key(key, now);
            }
            self.step(now);
            terminal.draw(|frame| self.draw(frame))?;
        }

        self.companion.shutdown();
        info!("Simulator stopped");
        Ok(())
    }

    /// Handle one key press
    pub fn handle_key(&mut self, key: KeyEvent, now: Millis) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            KeyCode::Char(' ') => self.hold_pad(TAP_HOLD_MS, now),
            KeyCode::Char('l') => self.hold_pad(LONG_HOLD_MS, now),
            KeyCode::Char('r') => self.hold_pad(RESET_HOLD_MS, now),
            _ => {}
        }
    }

    fn hold_pad(&mut self, hold: Millis, now: Millis) {
        if self.booting || self.press.is_some() {
            return;
        }
        debug!(hold, "Pad down");
        self.press = Some(HeldPress { started: now, hold });
    }

    fn raw_touch(&mut self, now: Millis) -> bool {
        match self.press {
            Some(press) if !has_elapsed(now, press.started, press.hold) => true,
            Some(_) => {
                self.press = None;
                false
            }
            None => false,
        }
    }

    /// Run one frame at `now`
    pub fn step(&mut self, now: Millis) {
        if self.booting {
            if !has_elapsed(now, self.started, BOOT_MS) {
                return;
            }
            self.booting = false;
            debug!("Boot splash done");
        }

        let modes = self.companion.modes_mut();
        modes.clock_mut().set_datetime(Local::now().naive_local());
        modes
            .sysinfo_mut()
            .set_stats(simulated_stats(elapsed(now, self.started)));

        let raw = self.raw_touch(now);
        self.companion.sample_touch(raw, now);
        self.companion.frame(now, Some(&mut self.canvas));
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let panel = Rect::new(
            area.x,
            area.y,
            area.width.min(PANEL_WIDTH),
            area.height.min(PANEL_ROWS),
        );
        frame.render_widget(&self.canvas, panel);

        if area.height > PANEL_ROWS {
            let status = Rect::new(
                area.x,
                area.y + PANEL_ROWS,
                area.width,
                (area.height - PANEL_ROWS).min(2),
            );
            let dim = Style::default().fg(Color::DarkGray);
            let lines = vec![
                Line::styled(status_line(&self.companion.snapshot()), dim),
                Line::styled(HELP, dim),
            ];
            frame.render_widget(Paragraph::new(lines), status);
        }
    }

    /// Whether the loop should keep going
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the boot splash is still up
    pub const fn is_booting(&self) -> bool {
        self.booting
    }

    /// The panel
    pub const fn canvas(&self) -> &PanelCanvas {
        &self.canvas
    }

    /// Device state
    pub fn snapshot(&self) -> CompanionSnapshot {
        self.companion.snapshot()
    }
}

/// One-line summary under the panel
pub fn status_line(snap: &CompanionSnapshot) -> String {
    let event = snap
        .last_event
        .map_or_else(|| "-".to_string(), |e| format!("{e:?}"));
    format!(
        " {} | contrast {:3} | {:?}/{:?} | {:?}{}{} | last {}",
        snap.mode,
        snap.contrast,
        snap.expression.eyes,
        snap.expression.mouth,
        snap.activity,
        if snap.dimmed { " | dimmed" } else { "" },
        if snap.touching { " | touching" } else { "" },
        event,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use companion_core::DisplayMode;
    use pretty_assertions::assert_eq;

    fn app() -> App {
        let args = Args::parse_from(["companion-sim", "--headless", "--seed", "3"]);
        let storage = open_storage(&args).unwrap();
        App::with_companion(start_companion(&args, storage, 0).unwrap(), 0)
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn run_frames(app: &mut App, from: Millis, to: Millis) {
        for now in (from..to).step_by(10) {
            app.step(now);
        }
    }

    #[test]
    fn test_boot_splash_first() {
        let mut app = app();
        let texts: Vec<&str> = app.canvas().text().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(&texts[..2], &["Desk", "Companion"]);

        run_frames(&mut app, 0, BOOT_MS);
        assert!(app.is_booting());
        app.step(BOOT_MS);
        assert!(!app.is_booting());
        assert!(app.canvas().text().is_empty());
        assert!(app.canvas().lit_pixels() > 0);
    }

    #[test]
    fn test_keys_ignored_while_booting() {
        let mut app = app();
        app.handle_key(key(' '), 100);
        run_frames(&mut app, 0, 2_000);
        assert_eq!(app.snapshot().last_event, None);
    }

    #[test]
    fn test_space_taps_to_clock() {
        let mut app = app();
        run_frames(&mut app, 0, 2_000);
        app.handle_key(key(' '), 2_000);
        run_frames(&mut app, 2_000, 2_500);
        assert_eq!(app.snapshot().mode, DisplayMode::Clock);
    }

    #[test]
    fn test_long_key_reacts() {
        let mut app = app();
        run_frames(&mut app, 0, 2_000);
        app.handle_key(key('l'), 2_000);
        run_frames(&mut app, 2_000, 4_100);
        assert_eq!(
            app.snapshot().last_event,
            Some(companion_core::TouchEvent::LongPress)
        );
        assert_eq!(app.snapshot().mode, DisplayMode::Face);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key(key('q'), 0);
        assert!(!app.is_running());

        let mut app = self::app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), 0);
        assert!(!app.is_running());
    }

    #[test]
    fn test_simulated_stats() {
        let stats = simulated_stats(25_000);
        assert_eq!(stats.uptime_secs, 25);
        assert_eq!(stats.wifi_rssi, Some(-66));
        assert_eq!(stats.free_heap_bytes, (180 + 25) * 1024);
    }

    #[test]
    fn test_status_line() {
        let app = app();
        let line = status_line(&app.snapshot());
        assert!(line.starts_with(" face | contrast 128"), "{line}");
        assert!(line.ends_with("last -"));
    }
}
