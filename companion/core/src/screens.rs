//! Information Screens
//!
//! The clock and system-status pages. The mode controller draws them
//! opaquely through [`Screen`]; their data is pushed in by the host loop
//! (time sync, heap and Wi-Fi readings live outside the core).

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::animation::assets::{MINI_FACE, MINI_FACE_SIZE};
use crate::render::{FontId, RenderSink, PANEL_WIDTH};

/// Something that can draw a full page
pub trait Screen {
    /// Draw the page into `sink`
    fn render(&self, sink: &mut dyn RenderSink);
}

/// Centre `text` horizontally on the panel
#[allow(clippy::cast_possible_wrap)]
fn centered_x(sink: &dyn RenderSink, text: &str, font: FontId) -> i16 {
    let width = sink.text_width(text, font).min(PANEL_WIDTH);
    ((PANEL_WIDTH - width) / 2) as i16
}

// ============================================================================
// Boot
// ============================================================================

/// Splash shown while the host brings up its peripherals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BootScreen;

impl Screen for BootScreen {
    fn render(&self, sink: &mut dyn RenderSink) {
        for (text, y) in [("Desk", 24), ("Companion", 44)] {
            let x = centered_x(sink, text, FontId::Medium);
            sink.draw_text(x, y, text, FontId::Medium);
        }
        let version = concat!("v", env!("CARGO_PKG_VERSION"));
        let x = centered_x(sink, version, FontId::Small);
        sink.draw_text(x, 60, version, FontId::Small);
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Time and date page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockScreen {
    now: NaiveDateTime,
    offline: bool,
}

impl ClockScreen {
    /// Clock showing midnight, 2024-01-01, until the first update
    #[must_use]
    pub fn new() -> Self {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self {
            now,
            offline: false,
        }
    }

    /// Update the displayed time
    pub fn set_datetime(&mut self, now: NaiveDateTime) {
        self.now = now;
    }

    /// Show or hide the "not synchronised" marker
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Displayed time
    #[must_use]
    pub const fn datetime(&self) -> NaiveDateTime {
        self.now
    }

    /// `HH:MM:SS`
    #[must_use]
    pub fn time_text(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            self.now.hour(),
            self.now.minute(),
            self.now.second()
        )
    }

    /// `YYYY-MM-DD`
    #[must_use]
    pub fn date_text(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.now.year(),
            self.now.month(),
            self.now.day()
        )
    }
}

impl Default for ClockScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for ClockScreen {
    fn render(&self, sink: &mut dyn RenderSink) {
        let (w, h) = MINI_FACE_SIZE;
        sink.draw_bitmap(4, 4, w, h, MINI_FACE);

        let time = self.time_text();
        let x = centered_x(sink, &time, FontId::LargeDigits);
        sink.draw_text(x, 38, &time, FontId::LargeDigits);

        let date = self.date_text();
        let x = centered_x(sink, &date, FontId::Small);
        sink.draw_text(x, 56, &date, FontId::Small);

        if self.offline {
            sink.draw_text(110, 10, "OFF", FontId::Small);
        }
    }
}

// ============================================================================
// System info
// ============================================================================

/// Heap size used for the memory bar
pub const TOTAL_HEAP_BYTES: u32 = 320 * 1024;

const MEMORY_BAR_WIDTH: u16 = 50;
const MEMORY_BAR_HEIGHT: u16 = 6;

/// Readings shown on the status page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStats {
    /// Free heap in bytes
    pub free_heap_bytes: u32,
    /// Seconds since boot
    pub uptime_secs: u32,
    /// Wi-Fi signal in dBm, `None` when disconnected
    pub wifi_rssi: Option<i8>,
}

/// Uptime as `HH:MM:SS`, or `Nd HH:MM:SS` past one day
#[must_use]
pub fn format_uptime(secs: u32) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;
    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Signal strength bars (0–4) for an RSSI reading
#[must_use]
pub const fn signal_bars(rssi: i8) -> u8 {
    match rssi {
        -50..=i8::MAX => 4,
        -60..=-51 => 3,
        -70..=-61 => 2,
        -80..=-71 => 1,
        _ => 0,
    }
}

/// Width in pixels of the used part of the memory bar
#[must_use]
pub fn memory_bar_fill(free_bytes: u32) -> u16 {
    let used = TOTAL_HEAP_BYTES.saturating_sub(free_bytes);
    let fill = u64::from(used) * u64::from(MEMORY_BAR_WIDTH) / u64::from(TOTAL_HEAP_BYTES);
    u16::try_from(fill).unwrap_or(MEMORY_BAR_WIDTH)
}

/// Memory, uptime and Wi-Fi page
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SysInfoScreen {
    stats: SystemStats,
}

impl SysInfoScreen {
    /// Empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the readings
    pub fn set_stats(&mut self, stats: SystemStats) {
        self.stats = stats;
    }

    /// Current readings
    #[must_use]
    pub const fn stats(&self) -> SystemStats {
        self.stats
    }

    fn draw_memory_bar(&self, sink: &mut dyn RenderSink, x: i16, y: i16) {
        sink.draw_rect(x, y, MEMORY_BAR_WIDTH, MEMORY_BAR_HEIGHT);
        let fill = memory_bar_fill(self.stats.free_heap_bytes);
        if fill > 2 {
            sink.fill_rect(x + 1, y + 1, fill - 2, MEMORY_BAR_HEIGHT - 2);
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn draw_signal(sink: &mut dyn RenderSink, x: i16, y: i16, rssi: i8) {
        let bars = signal_bars(rssi);
        for i in 0..4u8 {
            let height = 2 + u16::from(i) * 2;
            let bx = x + i16::from(i) * 5;
            let by = y + (8 - height as i16);
            if i < bars {
                sink.fill_rect(bx, by, 3, height);
            } else {
                sink.draw_rect(bx, by, 3, height);
            }
        }
    }
}

impl Screen for SysInfoScreen {
    fn render(&self, sink: &mut dyn RenderSink) {
        sink.draw_text(0, 10, "System Info", FontId::Small);
        sink.fill_rect(0, 12, PANEL_WIDTH, 1);

        let mem = format!("Mem: {}KB", self.stats.free_heap_bytes / 1024);
        sink.draw_text(0, 26, &mem, FontId::Small);
        self.draw_memory_bar(sink, 70, 18);

        sink.draw_text(0, 40, "Up:", FontId::Small);
        sink.draw_text(24, 40, &format_uptime(self.stats.uptime_secs), FontId::Small);

        match self.stats.wifi_rssi {
            Some(rssi) => {
                sink.draw_text(0, 54, &format!("WiFi: {rssi}dBm"), FontId::Small);
                Self::draw_signal(sink, 100, 46, rssi);
            }
            None => sink.draw_text(0, 54, "WiFi: --", FontId::Small),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingSink};
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 7)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .unwrap()
    }

    #[test]
    fn test_boot_screen_is_centered() {
        let mut sink = RecordingSink::new();
        BootScreen.render(&mut sink);
        assert_eq!(
            sink.visible_text(),
            vec!["Desk", "Companion", concat!("v", env!("CARGO_PKG_VERSION"))]
        );
        // 9 glyphs * 8px = 72px -> x = 28
        assert!(sink.commands().contains(&DrawCommand::Text {
            x: 28,
            y: 44,
            text: "Companion".to_string(),
            font: FontId::Medium,
        }));
    }

    #[test]
    fn test_clock_text_is_zero_padded() {
        let mut clock = ClockScreen::new();
        clock.set_datetime(at(9, 5, 3));
        assert_eq!(clock.time_text(), "09:05:03");
        assert_eq!(clock.date_text(), "2025-03-07");
    }

    #[test]
    fn test_clock_render() {
        let mut clock = ClockScreen::new();
        clock.set_datetime(at(23, 59, 59));
        let mut sink = RecordingSink::new();
        clock.render(&mut sink);

        assert_eq!(sink.visible_bitmaps(), vec![MINI_FACE]);
        assert_eq!(sink.visible_text(), vec!["23:59:59", "2025-03-07"]);

        // 8 glyphs * 13px = 104px -> x = 12
        assert!(sink.commands().contains(&DrawCommand::Text {
            x: 12,
            y: 38,
            text: "23:59:59".to_string(),
            font: FontId::LargeDigits,
        }));
    }

    #[test]
    fn test_clock_offline_marker() {
        let mut clock = ClockScreen::new();
        clock.set_offline(true);
        let mut sink = RecordingSink::new();
        clock.render(&mut sink);
        assert!(sink.visible_text().contains(&"OFF".to_string()));
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "00:00:00");
        assert_eq!(format_uptime(3_725), "01:02:05");
        assert_eq!(format_uptime(90_061), "1d 01:01:01");
    }

    #[test]
    fn test_signal_bars() {
        assert_eq!(signal_bars(-30), 4);
        assert_eq!(signal_bars(-50), 4);
        assert_eq!(signal_bars(-51), 3);
        assert_eq!(signal_bars(-65), 2);
        assert_eq!(signal_bars(-80), 1);
        assert_eq!(signal_bars(-81), 0);
        assert_eq!(signal_bars(i8::MIN), 0);
    }

    #[test]
    fn test_memory_bar_fill() {
        assert_eq!(memory_bar_fill(TOTAL_HEAP_BYTES), 0);
        assert_eq!(memory_bar_fill(0), MEMORY_BAR_WIDTH);
        assert_eq!(memory_bar_fill(TOTAL_HEAP_BYTES / 2), MEMORY_BAR_WIDTH / 2);
        assert_eq!(memory_bar_fill(u32::MAX), 0);
    }

    #[test]
    fn test_sysinfo_render_disconnected() {
        let mut screen = SysInfoScreen::new();
        screen.set_stats(SystemStats {
            free_heap_bytes: 200 * 1024,
            uptime_secs: 61,
            wifi_rssi: None,
        });
        let mut sink = RecordingSink::new();
        screen.render(&mut sink);

        assert_eq!(
            sink.visible_text(),
            vec!["System Info", "Mem: 200KB", "Up:", "00:01:01", "WiFi: --"]
        );
    }

    #[test]
    fn test_sysinfo_render_signal_bars() {
        let mut screen = SysInfoScreen::new();
        screen.set_stats(SystemStats {
            free_heap_bytes: 100 * 1024,
            uptime_secs: 0,
            wifi_rssi: Some(-55),
        });
        let mut sink = RecordingSink::new();
        screen.render(&mut sink);

        let filled_bars = sink
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { w: 3, .. }))
            .count();
        assert_eq!(filled_bars, 3);
        assert!(sink.visible_text().contains(&"WiFi: -55dBm".to_string()));
    }
}
