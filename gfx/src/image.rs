//! Two-plane bitmap images (icons, logos).

use crate::blit::{write_word_masked, write_word_or};
use crate::canvas::Canvas;
use crate::fb::{FrameBuffer, Plane};

/// A bitmap with the same two planes as the framebuffer. Each row of each
/// plane is `stride()` bytes, MSB leftmost.
#[derive(Copy, Clone, Debug)]
pub struct Image<'d> {
    pub width: u16,
    pub height: u16,
    pub mask: &'d [u8],
    pub level: &'d [u8],
}

impl<'d> Image<'d> {
    pub fn stride(&self) -> usize {
        (usize::from(self.width) + 7) / 8
    }
}

impl<'a> Canvas<'a> {
    /// Draws `image` with its top left corner at `(x, y)`.
    ///
    /// Opaque image pixels replace what is underneath; transparent ones leave
    /// it alone. Images must fit horizontally or they are skipped; rows past
    /// the bottom of the canvas are dropped.
    pub fn draw_image(&mut self, x: i32, y: i32, image: &Image) {
        let w = i32::from(image.width);
        if x < 0 || y < 0 || x + w > self.bounds.right + 1 || y > self.bounds.bottom {
            return;
        }
        let stride = image.stride();
        let x_offset = x as usize % 8;
        for row in 0..usize::from(image.height) {
            let yy = y as usize + row;
            if yy > self.bounds.bottom as usize {
                break;
            }
            let (base, _) = FrameBuffer::address_of(x as usize, yy);
            for k in 0..stride {
                let src = row * stride + k;
                let (mask, level) = match (image.mask.get(src), image.level.get(src)) {
                    (Some(&m), Some(&l)) => (m, l),
                    _ => return,
                };
                let valid = (usize::from(image.width) - k * 8).min(8);
                let keep = !(0xFFu16 >> valid) as u8;
                let mask = u16::from(mask & keep) << 8;
                let level = u16::from(level) << 8;

                write_word_or(self.fb.plane_mut(Plane::Mask), mask, base + k, x_offset);
                write_word_masked(
                    self.fb.plane_mut(Plane::Level),
                    level,
                    mask,
                    base + k,
                    x_offset,
                );
            }
        }
    }
}
