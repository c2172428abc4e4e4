//! Outlined bitmap text.
//!
//! Glyph rows carry two bitmaps side by side: which pixels the glyph covers
//! (its mask) and which of those are border rather than body. Drawing a row
//! makes the covered pixels opaque and white, then knocks the border pixels
//! down to black, so text comes out outlined in a single pass.

use crate::blit::{write_word_nand, write_word_or};
use crate::canvas::Canvas;
use crate::fb::{FrameBuffer, Plane};

/// Lookup table entry for characters the font does not contain.
pub const NO_GLYPH: u8 = 255;

/// Row data for all glyphs in a font, glyph after glyph, `height` rows each.
#[derive(Copy, Clone, Debug)]
pub enum Glyphs {
    /// Fonts up to 8 pixels wide. High byte is the border bitmap, low byte
    /// the mask bitmap; bit 7 of each is the leftmost pixel.
    Narrow(&'static [u16]),
    /// Fonts up to 16 pixels wide. High half is the border bitmap, low half
    /// the mask bitmap; bit 15 of each is the leftmost pixel.
    Wide(&'static [u32]),
}

#[derive(Copy, Clone, Debug)]
pub struct Font {
    pub width: u8,
    pub height: u8,
    /// Maps character codes to glyph numbers, or `NO_GLYPH`.
    pub lookup: &'static [u8; 256],
    pub glyphs: Glyphs,
}

impl Font {
    pub fn glyph_index(&self, code: u8) -> Option<usize> {
        match self.lookup[usize::from(code)] {
            NO_GLYPH => None,
            i => Some(usize::from(i)),
        }
    }

    /// Returns the `(mask, border)` words for one row of a glyph, with the
    /// leftmost pixel in bit 15. Returns `None` if the font's data is too
    /// short to contain the row.
    pub fn row(&self, glyph: usize, row: usize) -> Option<(u16, u16)> {
        let i = glyph * usize::from(self.height) + row;
        let (mask, border) = match self.glyphs {
            Glyphs::Narrow(d) => {
                let w = *d.get(i)?;
                ((w & 0xFF) << 8, w & 0xFF00)
            }
            Glyphs::Wide(d) => {
                let w = *d.get(i)?;
                (w as u16, (w >> 16) as u16)
            }
        };
        // Bits past the glyph width belong to nobody.
        let keep = (0xFFFF_0000u32 >> self.width.min(16)) as u16;
        Some((mask & keep, border & keep))
    }
}

/// Size of a block of text in pixels.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

fn is_line_break(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

/// Measures `text` as `draw_string` would lay it out: the longest line's
/// character count times the advance, by the line count times the line
/// pitch. Line breaks themselves take no space.
pub fn measure(text: &str, font: &Font, x_spacing: i32, y_spacing: i32) -> Dimensions {
    let mut longest = 0;
    let mut current = 0;
    let mut lines = 1;
    for b in text.bytes() {
        if is_line_break(b) {
            longest = longest.max(current);
            current = 0;
            lines += 1;
        } else {
            current += 1;
        }
    }
    longest = longest.max(current);
    Dimensions {
        width: longest * (i32::from(font.width) + x_spacing),
        height: lines * (i32::from(font.height) + y_spacing),
    }
}

impl<'a> Canvas<'a> {
    /// Draws one character with its top left corner at `(x, y)`.
    ///
    /// Characters missing from the font, characters entirely off the canvas,
    /// and characters that don't fit horizontally are skipped. Characters
    /// that hang off the top or bottom are clipped row by row.
    pub fn draw_char(&mut self, code: u8, x: i32, y: i32, font: &Font) {
        let glyph = match font.glyph_index(code) {
            Some(g) => g,
            None => return,
        };
        let (w, h) = (i32::from(font.width), i32::from(font.height));
        let b = self.bounds;
        if x + w <= 0 || x > b.right || y + h <= 0 || y > b.bottom {
            return;
        }
        if x < 0 || x + w > b.right + 1 {
            return;
        }

        let x_offset = x as usize % 8;
        for row in 0..h {
            let yy = y + row;
            if yy < 0 || yy > b.bottom {
                continue;
            }
            let (mask, border) = match font.row(glyph, row as usize) {
                Some(words) => words,
                None => return,
            };
            let (index, _) = FrameBuffer::address_of(x as usize, yy as usize);
            write_word_or(self.fb.plane_mut(Plane::Mask), mask, index, x_offset);
            let level = self.fb.plane_mut(Plane::Level);
            write_word_or(level, mask, index, x_offset);
            write_word_nand(level, mask & border, index, x_offset);
        }
    }

    /// Draws `text` anchored at `(x, y)` according to the alignment.
    ///
    /// Characters advance by the glyph width plus `x_spacing`; `'\n'` and
    /// `'\r'` return to the left edge of the block and move down by the glyph
    /// height plus `y_spacing`.
    pub fn draw_string(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        x_spacing: i32,
        y_spacing: i32,
        valign: VAlign,
        halign: HAlign,
        font: &Font,
    ) {
        let dim = measure(text, font, x_spacing, y_spacing);
        let mut yy = match valign {
            VAlign::Top => y,
            VAlign::Middle => y - dim.height / 2 + 1,
            VAlign::Bottom => y - dim.height,
        };
        let left = match halign {
            HAlign::Left => x,
            HAlign::Center => x - dim.width / 2,
            HAlign::Right => x - dim.width,
        };

        let mut xx = left;
        for b in text.bytes() {
            if is_line_break(b) {
                yy += i32::from(font.height) + y_spacing;
                xx = left;
            } else {
                if xx >= 0 && xx <= self.bounds.right {
                    self.draw_char(b, xx, yy, font);
                }
                xx += i32::from(font.width) + x_spacing;
            }
        }
    }
}
