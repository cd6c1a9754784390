//! Render Sink
//!
//! The drawing surface the core writes through. Implementations own pixel
//! formats and hardware transport; the core only names assets by opaque id.
//!
//! [`RecordingSink`] captures the command stream. Tests assert on it, and the
//! simulator's headless mode uses it as a null display that still reports
//! contrast.

use serde::{Deserialize, Serialize};

/// Panel width in pixels
pub const PANEL_WIDTH: u16 = 128;
/// Panel height in pixels
pub const PANEL_HEIGHT: u16 = 64;

/// Opaque reference to a bitmap asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BitmapId(pub u16);

/// Opaque reference to a font asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontId {
    /// 6x10 fixed pitch, used for labels
    Small,
    /// Bold 10px, used for messages
    Medium,
    /// Large numeric font, used for the clock face
    LargeDigits,
}

impl FontId {
    /// Nominal advance per glyph, in pixels
    #[must_use]
    pub const fn advance(self) -> u16 {
        match self {
            Self::Small => 6,
            Self::Medium => 8,
            Self::LargeDigits => 13,
        }
    }
}

/// Drawing surface consumed by the core
///
/// Coordinates are panel pixels; text `y` is the baseline.
pub trait RenderSink {
    /// Blit a bitmap asset with its top-left corner at (x, y)
    fn draw_bitmap(&mut self, x: i16, y: i16, w: u16, h: u16, bitmap: BitmapId);

    /// Draw a string
    fn draw_text(&mut self, x: i16, y: i16, text: &str, font: FontId);

    /// Rectangle outline
    fn draw_rect(&mut self, x: i16, y: i16, w: u16, h: u16);

    /// Filled rectangle
    fn fill_rect(&mut self, x: i16, y: i16, w: u16, h: u16);

    /// Panel contrast (0 = dark, 255 = full)
    fn set_contrast(&mut self, level: u8);

    /// Clear the back buffer
    fn clear(&mut self);

    /// Push the back buffer to the panel
    fn flush(&mut self);

    /// Rendered width of `text` in `font`
    #[allow(clippy::cast_possible_truncation)]
    fn text_width(&self, text: &str, font: FontId) -> u16 {
        (text.chars().count() as u16).saturating_mul(font.advance())
    }
}

/// One recorded sink call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawCommand {
    /// `draw_bitmap`
    Bitmap {
        /// Left edge
        x: i16,
        /// Top edge
        y: i16,
        /// Width
        w: u16,
        /// Height
        h: u16,
        /// Asset
        id: BitmapId,
    },
    /// `draw_text`
    Text {
        /// Left edge
        x: i16,
        /// Baseline
        y: i16,
        /// Content
        text: String,
        /// Font
        font: FontId,
    },
    /// `draw_rect`
    Rect {
        /// Left edge
        x: i16,
        /// Top edge
        y: i16,
        /// Width
        w: u16,
        /// Height
        h: u16,
    },
    /// `fill_rect`
    FillRect {
        /// Left edge
        x: i16,
        /// Top edge
        y: i16,
        /// Width
        w: u16,
        /// Height
        h: u16,
    },
    /// `set_contrast`
    Contrast(u8),
    /// `clear`
    Clear,
    /// `flush`
    Flush,
}

/// Sink that records every call
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Vec<DrawCommand>,
    contrast: Option<u8>,
    frames: usize,
}

impl RecordingSink {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded command, oldest first
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Last contrast written, if any
    #[must_use]
    pub fn contrast(&self) -> Option<u8> {
        self.contrast
    }

    /// Number of `flush` calls
    #[must_use]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Bitmaps drawn since the last `clear`
    #[must_use]
    pub fn visible_bitmaps(&self) -> Vec<BitmapId> {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .map_or(0, |i| i + 1);
        self.commands[start..]
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Bitmap { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Text drawn since the last `clear`
    #[must_use]
    pub fn visible_text(&self) -> Vec<String> {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .map_or(0, |i| i + 1);
        self.commands[start..]
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Drop recorded commands, keeping the contrast and frame count
    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl RenderSink for RecordingSink {
    fn draw_bitmap(&mut self, x: i16, y: i16, w: u16, h: u16, bitmap: BitmapId) {
        self.commands.push(DrawCommand::Bitmap {
            x,
            y,
            w,
            h,
            id: bitmap,
        });
    }

    fn draw_text(&mut self, x: i16, y: i16, text: &str, font: FontId) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            font,
        });
    }

    fn draw_rect(&mut self, x: i16, y: i16, w: u16, h: u16) {
        self.commands.push(DrawCommand::Rect { x, y, w, h });
    }

    fn fill_rect(&mut self, x: i16, y: i16, w: u16, h: u16) {
        self.commands.push(DrawCommand::FillRect { x, y, w, h });
    }

    fn set_contrast(&mut self, level: u8) {
        self.contrast = Some(level);
        self.commands.push(DrawCommand::Contrast(level));
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn flush(&mut self) {
        self.frames += 1;
        self.commands.push(DrawCommand::Flush);
    }
}
