//! Sprite Definitions
//!
//! Blocky 1-bit art for the panel bitmaps the core names by id. Patterns are
//! drawn at half resolution and doubled when built, so a 16×16 eye is an
//! 8×8 pattern.

use std::collections::HashMap;

use companion_core::animation::assets::{
    EYE_CLOSED, EYE_HALF, EYE_LEFT, EYE_OPEN, EYE_RIGHT, EYE_SIZE, EYE_SQUINT, MINI_FACE,
    MINI_FACE_SIZE, MOUTH_NEUTRAL, MOUTH_SIZE, MOUTH_SMILE, MOUTH_SURPRISED, MOUTH_TALK_A,
    MOUTH_TALK_B,
};
use companion_core::BitmapId;

/// Pattern cell that lights a pixel
const LIT: char = '#';

/// Scale applied to every pattern
const SCALE: u16 = 2;

/// A 1-bit image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sprite {
    width: u16,
    height: u16,
    pixels: Vec<bool>,
}

impl Sprite {
    /// Width in pixels
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Pixel at (x, y); out of bounds is dark
    pub fn get(&self, x: u16, y: u16) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels[usize::from(y) * usize::from(self.width) + usize::from(x)]
    }
}

/// Parse a pattern, scaling each cell to `scale`×`scale` pixels
///
/// `#` is lit, anything else is dark. Short rows are padded dark.
///
/// ```ignore
/// let dot = build_sprite(&[" # ", "###", " # "], 2);
/// assert_eq!(dot.width(), 6);
/// ```
pub fn build_sprite(pattern: &[&str], scale: u16) -> Sprite {
    let cols = pattern.iter().map(|row| row.chars().count()).max().unwrap_or(0);
    let width = u16::try_from(cols).unwrap_or(u16::MAX).saturating_mul(scale);
    let height = u16::try_from(pattern.len()).unwrap_or(u16::MAX).saturating_mul(scale);

    let mut pixels = vec![false; usize::from(width) * usize::from(height)];
    for (row, line) in pattern.iter().enumerate() {
        for (col, c) in line.chars().enumerate() {
            if c != LIT {
                continue;
            }
            for dy in 0..usize::from(scale) {
                for dx in 0..usize::from(scale) {
                    let x = col * usize::from(scale) + dx;
                    let y = row * usize::from(scale) + dy;
                    pixels[y * usize::from(width) + x] = true;
                }
            }
        }
    }

    Sprite {
        width,
        height,
        pixels,
    }
}

// ============================================================================
// Eyes (8×8, drawn 16×16)
// ============================================================================

const EYE_OPEN_ART: &[&str] = &[
    "  ####  ",
    " ###### ",
    "########",
    "###  ###",
    "###  ###",
    "########",
    " ###### ",
    "  ####  ",
];

const EYE_HALF_ART: &[&str] = &[
    "        ",
    "        ",
    "########",
    "########",
    "###  ###",
    "########",
    " ###### ",
    "  ####  ",
];

const EYE_SQUINT_ART: &[&str] = &[
    "        ",
    "        ",
    "        ",
    "        ",
    "########",
    " ###### ",
    "        ",
    "        ",
];

const EYE_CLOSED_ART: &[&str] = &[
    "        ",
    "        ",
    "        ",
    "        ",
    "#      #",
    " ###### ",
    "        ",
    "        ",
];

const EYE_LEFT_ART: &[&str] = &[
    "  ####  ",
    " ###### ",
    "########",
    "  ######",
    "  ######",
    "########",
    " ###### ",
    "  ####  ",
];

const EYE_RIGHT_ART: &[&str] = &[
    "  ####  ",
    " ###### ",
    "########",
    "######  ",
    "######  ",
    "########",
    " ###### ",
    "  ####  ",
];

// ============================================================================
// Mouths (16×8, drawn 32×16)
// ============================================================================

const MOUTH_SMILE_ART: &[&str] = &[
    "                ",
    "                ",
    "#              #",
    " #            # ",
    "  ##        ##  ",
    "    ########    ",
    "                ",
    "                ",
];

const MOUTH_NEUTRAL_ART: &[&str] = &[
    "                ",
    "                ",
    "                ",
    "                ",
    "   ##########   ",
    "                ",
    "                ",
    "                ",
];

const MOUTH_SURPRISED_ART: &[&str] = &[
    "                ",
    "      ####      ",
    "     #    #     ",
    "    #      #    ",
    "    #      #    ",
    "     #    #     ",
    "      ####      ",
    "                ",
];

const MOUTH_TALK_A_ART: &[&str] = &[
    "                ",
    "                ",
    "                ",
    "    ########    ",
    "     #    #     ",
    "      ####      ",
    "                ",
    "                ",
];

const MOUTH_TALK_B_ART: &[&str] = &[
    "                ",
    "                ",
    "   ##########   ",
    "   #        #   ",
    "    #      #    ",
    "     ######     ",
    "                ",
    "                ",
];

// ============================================================================
// Icons
// ============================================================================

const MINI_FACE_ART: &[&str] = &[
    "  ####  ",
    " #    # ",
    "# #  # #",
    "#      #",
    "# #  # #",
    "#  ##  #",
    " #    # ",
    "  ####  ",
];

/// Every sprite the panel knows, by bitmap id
pub struct SpriteSheet {
    sprites: HashMap<BitmapId, Sprite>,
}

impl SpriteSheet {
    /// Sheet covering every id the core draws
    pub fn panel() -> Self {
        let table: [(BitmapId, &[&str]); 12] = [
            (EYE_OPEN, EYE_OPEN_ART),
            (EYE_HALF, EYE_HALF_ART),
            (EYE_SQUINT, EYE_SQUINT_ART),
            (EYE_CLOSED, EYE_CLOSED_ART),
            (EYE_LEFT, EYE_LEFT_ART),
            (EYE_RIGHT, EYE_RIGHT_ART),
            (MOUTH_SMILE, MOUTH_SMILE_ART),
            (MOUTH_NEUTRAL, MOUTH_NEUTRAL_ART),
            (MOUTH_SURPRISED, MOUTH_SURPRISED_ART),
            (MOUTH_TALK_A, MOUTH_TALK_A_ART),
            (MOUTH_TALK_B, MOUTH_TALK_B_ART),
            (MINI_FACE, MINI_FACE_ART),
        ];

        let sprites = table
            .iter()
            .map(|&(id, art)| (id, build_sprite(art, SCALE)))
            .collect();
        Self { sprites }
    }

    /// Sprite for `id`, if the sheet has one
    pub fn get(&self, id: BitmapId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    /// Number of sprites
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// Whether the sheet is empty
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl Default for SpriteSheet {
    fn default() -> Self {
        Self::panel()
    }
}
