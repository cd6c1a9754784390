//! Headless Simulation
//!
//! Steps a [`Companion`] on a [`ManualClock`] at a fixed frame step, holds
//! the pad according to a touch script, and writes one JSON line per
//! simulated second. The same seed and script always give the same output.

use std::io::Write;

use anyhow::{ensure, Context};
use serde::Serialize;
use tracing::info;

use companion_core::time::elapsed;
use companion_core::{
    Clock, Companion, CompanionSnapshot, ConfigStorage, ManualClock, Millis, RecordingSink,
};

/// One scripted press, relative to the start of the run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Press {
    /// When the pad goes down
    pub at: Millis,
    /// How long it stays down
    pub hold: Millis,
}

impl Press {
    const fn new(at: Millis, hold: Millis) -> Self {
        Self { at, hold }
    }

    fn is_down(&self, offset: Millis) -> bool {
        offset >= self.at && offset - self.at < self.hold
    }
}

/// Default script: three taps round the modes, then a long press on the
/// face, then hands off so dim and sleep play out
pub const DEFAULT_SCRIPT: [Press; 4] = [
    Press::new(3_000, 150),
    Press::new(6_000, 150),
    Press::new(9_000, 150),
    Press::new(12_000, 2_500),
];

/// Run parameters
#[derive(Clone, Debug)]
pub struct HeadlessOptions {
    /// Simulated seconds
    pub seconds: u32,
    /// Frame step in ms
    pub frame_ms: Millis,
    /// Clock value of the first frame
    pub start: Millis,
    /// Pad presses
    pub script: Vec<Press>,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            seconds: 60,
            frame_ms: 10,
            start: 0,
            script: DEFAULT_SCRIPT.to_vec(),
        }
    }
}

/// One line of output
#[derive(Debug, Serialize)]
pub struct SecondReport {
    /// Simulated seconds since start
    pub second: u32,
    /// Panel frames pushed during this second
    pub panel_frames: usize,
    /// Device state at the end of the second
    #[serde(flatten)]
    pub snapshot: CompanionSnapshot,
}

/// Run the simulation; returns the number of lines written
///
/// The companion must have been created at `options.start`.
pub fn run<S: ConfigStorage, W: Write>(
    companion: &mut Companion<S>,
    options: &HeadlessOptions,
    out: &mut W,
) -> anyhow::Result<u32> {
    ensure!(
        options.frame_ms > 0 && 1_000 % options.frame_ms == 0,
        "frame step {} ms does not divide one second",
        options.frame_ms
    );

    info!(
        seconds = options.seconds,
        frame_ms = options.frame_ms,
        start = options.start,
        presses = options.script.len(),
        "Headless run starting"
    );

    let mut clock = ManualClock::starting_at(options.start);
    let mut sink = RecordingSink::new();
    let mut flushed_before = 0;
    let mut reports = 0;

    while reports < options.seconds {
        let now = clock.now();
        let offset = elapsed(now, options.start);
        let raw = options.script.iter().any(|p| p.is_down(offset));

        companion.sample_touch(raw, now);
        companion.frame(now, Some(&mut sink));
        let now = clock.advance(options.frame_ms);

        if elapsed(now, options.start) % 1_000 == 0 {
            reports += 1;
            let report = SecondReport {
                second: reports,
                panel_frames: sink.frames() - flushed_before,
                snapshot: companion.snapshot(),
            };
            serde_json::to_writer(&mut *out, &report).context("Failed to encode snapshot")?;
            writeln!(out).context("Failed to write snapshot")?;

            flushed_before = sink.frames();
            sink.reset();
        }
    }

    companion.shutdown();
    out.flush().context("Failed to flush output")?;
    info!(lines = reports, "Headless run finished");
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_window() {
        let press = Press::new(100, 50);
        assert!(!press.is_down(99));
        assert!(press.is_down(100));
        assert!(press.is_down(149));
        assert!(!press.is_down(150));
    }

    #[test]
    fn test_default_script_is_ordered() {
        assert!(DEFAULT_SCRIPT
            .windows(2)
            .all(|w| w[0].at + w[0].hold < w[1].at));
    }
}
