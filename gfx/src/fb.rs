//! Framebuffer storage and addressing.
//!
//! Pixels are stored one bit per pixel in two parallel byte arrays. Within a
//! byte, the most significant bit is the leftmost pixel, which matches the
//! order the serializer shifts bits out onto the video line.
//!
//! This is the only place that knows how `(x, y)` maps onto storage. The
//! functions here assume their inputs are valid; bounds checks belong to the
//! caller (see `Canvas`).

/// Bytes per row in each plane. Sized for the wider of the two video
/// standards.
pub const BUFFER_WIDTH: usize = 44;
/// Rows in each plane. Sized for the taller of the two video standards.
pub const BUFFER_HEIGHT: usize = 266;
/// Bytes in each plane.
pub const BUFFER_SIZE: usize = BUFFER_WIDTH * BUFFER_HEIGHT;
/// Width of a plane in pixels.
pub const BUFFER_WIDTH_PX: usize = BUFFER_WIDTH * 8;

/// Selects one of the two planes of a `FrameBuffer`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Plane {
    /// Opacity. A set bit replaces the incoming video with the overlay.
    Mask,
    /// Brightness of opaque pixels. A set bit is white.
    Level,
}

/// Compositing mode for writing bits into a plane.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    Clear,
    Set,
    Toggle,
}

impl Mode {
    /// Applies this mode to the bits of `byte` selected by `mask`.
    #[inline(always)]
    pub fn apply(self, byte: u8, mask: u8) -> u8 {
        match self {
            Mode::Clear => byte & !mask,
            Mode::Set => byte | mask,
            Mode::Toggle => byte ^ mask,
        }
    }
}

pub struct FrameBuffer {
    mask: [u8; BUFFER_SIZE],
    level: [u8; BUFFER_SIZE],
}

impl FrameBuffer {
    /// Creates an empty (fully transparent) framebuffer. This is a `const fn`
    /// so framebuffers can be placed in statics.
    pub const fn new() -> Self {
        FrameBuffer {
            mask: [0; BUFFER_SIZE],
            level: [0; BUFFER_SIZE],
        }
    }

    /// Makes every pixel transparent.
    pub fn clear(&mut self) {
        for b in self.mask.iter_mut().chain(self.level.iter_mut()) {
            *b = 0;
        }
    }

    /// Computes the byte index and bit mask holding pixel `(x, y)`.
    ///
    /// The caller is responsible for keeping `x` below `BUFFER_WIDTH_PX` and
    /// `y` below `BUFFER_HEIGHT`.
    #[inline(always)]
    pub fn address_of(x: usize, y: usize) -> (usize, u8) {
        (y * BUFFER_WIDTH + x / 8, 0x80 >> (x % 8))
    }

    /// Updates the bits selected by `mask` in byte `index` of `plane`.
    ///
    /// # Panics
    ///
    /// If `index` is outside the plane.
    #[inline(always)]
    pub fn write(&mut self, plane: Plane, index: usize, mask: u8, mode: Mode) {
        let b = &mut self.plane_mut(plane)[index];
        *b = mode.apply(*b, mask);
    }

    /// Replaces the bits selected by `mask` in byte `index` of `plane` with
    /// the corresponding bits of `value`.
    ///
    /// # Panics
    ///
    /// If `index` is outside the plane.
    #[inline(always)]
    pub fn write_value(&mut self, plane: Plane, index: usize, mask: u8, value: u8) {
        let b = &mut self.plane_mut(plane)[index];
        *b = (*b & !mask) | (value & mask);
    }

    pub fn plane(&self, plane: Plane) -> &[u8; BUFFER_SIZE] {
        match plane {
            Plane::Mask => &self.mask,
            Plane::Level => &self.level,
        }
    }

    pub fn plane_mut(&mut self, plane: Plane) -> &mut [u8; BUFFER_SIZE] {
        match plane {
            Plane::Mask => &mut self.mask,
            Plane::Level => &mut self.level,
        }
    }

    /// Borrows one row of a plane.
    ///
    /// # Panics
    ///
    /// If `y` is not less than `BUFFER_HEIGHT`.
    pub fn row(&self, plane: Plane, y: usize) -> &[u8] {
        let start = y * BUFFER_WIDTH;
        &self.plane(plane)[start..start + BUFFER_WIDTH]
    }

    /// Reads back a single pixel of a plane. Intended for inspection and
    /// simulation, not for drawing.
    pub fn get(&self, plane: Plane, x: usize, y: usize) -> bool {
        let (index, bit) = Self::address_of(x, y);
        self.plane(plane)[index] & bit != 0
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addressing_is_msb_first() {
        assert_eq!(FrameBuffer::address_of(0, 0), (0, 0x80));
        assert_eq!(FrameBuffer::address_of(7, 0), (0, 0x01));
        assert_eq!(FrameBuffer::address_of(8, 0), (1, 0x80));
        assert_eq!(FrameBuffer::address_of(3, 2), (2 * BUFFER_WIDTH, 0x10));
        assert_eq!(
            FrameBuffer::address_of(BUFFER_WIDTH_PX - 1, BUFFER_HEIGHT - 1),
            (BUFFER_SIZE - 1, 0x01)
        );
    }

    #[test]
    fn every_pixel_has_a_unique_address() {
        let mut seen = vec![0u8; BUFFER_SIZE];
        for y in 0..BUFFER_HEIGHT {
            for x in 0..BUFFER_WIDTH_PX {
                let (i, m) = FrameBuffer::address_of(x, y);
                assert_eq!(seen[i] & m, 0, "({}, {}) aliases", x, y);
                seen[i] |= m;
            }
        }
        assert!(seen.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn write_modes() {
        let mut fb = Box::new(FrameBuffer::new());
        fb.write(Plane::Mask, 5, 0b1010_0000, Mode::Set);
        assert_eq!(fb.plane(Plane::Mask)[5], 0b1010_0000);
        fb.write(Plane::Mask, 5, 0b1100_0000, Mode::Toggle);
        assert_eq!(fb.plane(Plane::Mask)[5], 0b0110_0000);
        fb.write(Plane::Mask, 5, 0b0100_0000, Mode::Clear);
        assert_eq!(fb.plane(Plane::Mask)[5], 0b0010_0000);
        // The other plane is untouched.
        assert!(fb.plane(Plane::Level).iter().all(|&b| b == 0));
    }

    #[test]
    fn write_value_only_touches_masked_bits() {
        let mut fb = Box::new(FrameBuffer::new());
        fb.write(Plane::Level, 0, 0xFF, Mode::Set);
        fb.write_value(Plane::Level, 0, 0x0F, 0x05);
        assert_eq!(fb.plane(Plane::Level)[0], 0xF5);
    }

    #[test]
    fn clear_empties_both_planes() {
        let mut fb = Box::new(FrameBuffer::new());
        fb.write(Plane::Mask, 17, 0xFF, Mode::Set);
        fb.write(Plane::Level, 900, 0x0F, Mode::Set);
        fb.clear();
        assert!(fb.plane(Plane::Mask).iter().all(|&b| b == 0));
        assert!(fb.plane(Plane::Level).iter().all(|&b| b == 0));
    }
}
