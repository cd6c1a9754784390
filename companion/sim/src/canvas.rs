//! Panel Canvas
//!
//! A [`RenderSink`] that rasterises into a 128×64 1-bit buffer and renders
//! it into the terminal. Two vertical pixels share one cell:
//!
//! ```text
//! top  bottom   cell
//!  on    on      █
//!  on    off     ▀
//!  off   on      ▄
//!  off   off    ' '
//! ```
//!
//! Text is not rasterised. Runs are kept beside the pixels and overlaid as
//! terminal glyphs, one glyph per pixel column, so [`RenderSink::text_width`]
//! reports widths in cells and the core's centring still lines up.

use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

use companion_core::render::{PANEL_HEIGHT, PANEL_WIDTH};
use companion_core::{BitmapId, FontId, RenderSink};

use crate::sprites::SpriteSheet;

/// Terminal rows the panel occupies
pub const PANEL_ROWS: u16 = PANEL_HEIGHT / 2;

/// Unlit panel background
pub const PANEL_BACKGROUND: Color = Color::Rgb(0, 0, 0);

/// Colour of a lit pixel at `contrast`
///
/// OLED-ish cyan, scaled linearly; contrast 0 is indistinguishable from the
/// background.
pub fn panel_color(contrast: u8) -> Color {
    let level = u16::from(contrast);
    let scale = |max: u16| u8::try_from(level * max / 255).unwrap_or(u8::MAX);
    Color::Rgb(scale(170), scale(230), scale(255))
}

/// Text drawn on the panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    /// Left pixel column
    pub x: i16,
    /// Baseline pixel row
    pub y: i16,
    /// Content
    pub text: String,
}

impl TextRun {
    /// Terminal row holding the glyphs
    fn row(&self) -> Option<u16> {
        let row = (self.y - 1).div_euclid(2);
        u16::try_from(row).ok().filter(|r| *r < PANEL_ROWS)
    }
}

#[derive(Clone, Debug)]
struct Layer {
    pixels: Vec<bool>,
    text: Vec<TextRun>,
}

impl Layer {
    fn blank() -> Self {
        Self {
            pixels: vec![false; usize::from(PANEL_WIDTH) * usize::from(PANEL_HEIGHT)],
            text: Vec::new(),
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(false);
        self.text.clear();
    }

    fn set(&mut self, x: i32, y: i32, on: bool) {
        let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
            return;
        };
        if x < PANEL_WIDTH && y < PANEL_HEIGHT {
            self.pixels[usize::from(y) * usize::from(PANEL_WIDTH) + usize::from(x)] = on;
        }
    }

    fn get(&self, x: u16, y: u16) -> bool {
        x < PANEL_WIDTH
            && y < PANEL_HEIGHT
            && self.pixels[usize::from(y) * usize::from(PANEL_WIDTH) + usize::from(x)]
    }
}

/// Double-buffered panel
///
/// Drawing goes to the back buffer; `flush` makes it visible.
pub struct PanelCanvas {
    sprites: SpriteSheet,
    back: Layer,
    front: Layer,
    contrast: u8,
    flushes: u64,
}

impl PanelCanvas {
    /// Blank panel at full contrast
    pub fn new() -> Self {
        Self {
            sprites: SpriteSheet::panel(),
            back: Layer::blank(),
            front: Layer::blank(),
            contrast: u8::MAX,
            flushes: 0,
        }
    }

    /// Whether a pixel is lit on the visible buffer
    pub fn pixel(&self, x: u16, y: u16) -> bool {
        self.front.get(x, y)
    }

    /// Lit pixels on the visible buffer
    pub fn lit_pixels(&self) -> usize {
        self.front.pixels.iter().filter(|p| **p).count()
    }

    /// Text on the visible buffer
    pub fn text(&self) -> &[TextRun] {
        &self.front.text
    }

    /// Current contrast
    pub const fn contrast(&self) -> u8 {
        self.contrast
    }

    /// Number of flushes so far
    pub const fn flushes(&self) -> u64 {
        self.flushes
    }

    /// Half-block glyph for terminal cell (col, row)
    pub fn cell_glyph(&self, col: u16, row: u16) -> char {
        let top = self.front.get(col, row * 2);
        let bottom = self.front.get(col, row * 2 + 1);
        match (top, bottom) {
            (true, true) => '█',
            (true, false) => '▀',
            (false, true) => '▄',
            (false, false) => ' ',
        }
    }

    fn fill(&mut self, x: i16, y: i16, w: u16, h: u16) {
        for dy in 0..i32::from(h) {
            for dx in 0..i32::from(w) {
                self.back.set(i32::from(x) + dx, i32::from(y) + dy, true);
            }
        }
    }
}

impl Default for PanelCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for PanelCanvas {
    fn draw_bitmap(&mut self, x: i16, y: i16, w: u16, h: u16, bitmap: BitmapId) {
        let Some(sprite) = self.sprites.get(bitmap) else {
            // Unknown art shows as its bounding box
            self.draw_rect(x, y, w, h);
            return;
        };
        for sy in 0..h.min(sprite.height()) {
            for sx in 0..w.min(sprite.width()) {
                if sprite.get(sx, sy) {
                    self.back
                        .set(i32::from(x) + i32::from(sx), i32::from(y) + i32::from(sy), true);
                }
            }
        }
    }

    fn draw_text(&mut self, x: i16, y: i16, text: &str, _font: FontId) {
        self.back.text.push(TextRun {
            x,
            y,
            text: text.to_string(),
        });
    }

    fn draw_rect(&mut self, x: i16, y: i16, w: u16, h: u16) {
        if w == 0 || h == 0 {
            return;
        }
        let (x, y) = (i32::from(x), i32::from(y));
        let (right, bottom) = (x + i32::from(w) - 1, y + i32::from(h) - 1);
        for px in x..=right {
            self.back.set(px, y, true);
            self.back.set(px, bottom, true);
        }
        for py in y..=bottom {
            self.back.set(x, py, true);
            self.back.set(right, py, true);
        }
    }

    fn fill_rect(&mut self, x: i16, y: i16, w: u16, h: u16) {
        self.fill(x, y, w, h);
    }

    fn set_contrast(&mut self, level: u8) {
        self.contrast = level;
    }

    fn clear(&mut self) {
        self.back.clear();
    }

    fn flush(&mut self) {
        self.front.clone_from(&self.back);
        self.flushes += 1;
    }

    fn text_width(&self, text: &str, _font: FontId) -> u16 {
        u16::try_from(text.chars().count()).unwrap_or(u16::MAX)
    }
}

impl Widget for &PanelCanvas {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lit = panel_color(self.contrast);
        let cols = area.width.min(PANEL_WIDTH);
        let rows = area.height.min(PANEL_ROWS);

        for row in 0..rows {
            for col in 0..cols {
                if let Some(cell) = buf.cell_mut(Position::new(area.x + col, area.y + row)) {
                    cell.set_char(self.cell_glyph(col, row))
                        .set_fg(lit)
                        .set_bg(PANEL_BACKGROUND);
                }
            }
        }

        let style = Style::default().fg(lit).bg(PANEL_BACKGROUND);
        for run in &self.front.text {
            let Some(row) = run.row().filter(|r| *r < rows) else {
                continue;
            };
            for (i, ch) in run.text.chars().enumerate() {
                let col = i32::from(run.x) + i32::try_from(i).unwrap_or(i32::MAX);
                let Ok(col) = u16::try_from(col) else {
                    continue;
                };
                if col >= cols {
                    break;
                }
                if let Some(cell) = buf.cell_mut(Position::new(area.x + col, area.y + row)) {
                    cell.set_char(ch).set_style(style);
                }
            }
        }
    }
}
