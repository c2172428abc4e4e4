//! Analog video standards and their overlay timing.

use core::sync::atomic::{AtomicU8, Ordering};

use osd_gfx::{Bounds, BUFFER_WIDTH};

/// Video standard of the incoming signal, as measured from its line count.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum VideoStandard {
    /// No complete field has been measured yet.
    Unknown = 0,
    Ntsc = 1,
    Pal = 2,
}

impl VideoStandard {
    /// Classifies a field from the number of lines it contained. Fields
    /// longer than `pal_threshold` lines are PAL.
    pub fn classify(lines: u32, pal_threshold: u32) -> Self {
        if lines > pal_threshold {
            VideoStandard::Pal
        } else {
            VideoStandard::Ntsc
        }
    }

    pub fn timing(self) -> &'static StandardTiming {
        match self {
            VideoStandard::Unknown => &UNKNOWN,
            VideoStandard::Ntsc => &NTSC,
            VideoStandard::Pal => &PAL,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => VideoStandard::Ntsc,
            2 => VideoStandard::Pal,
            _ => VideoStandard::Unknown,
        }
    }
}

impl Default for VideoStandard {
    fn default() -> Self {
        VideoStandard::Unknown
    }
}

/// Where and how much of each field the overlay covers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StandardTiming {
    pub standard: VideoStandard,
    /// Number of overlay lines streamed per field.
    pub visible_lines: usize,
    /// Scanline number of the first overlay line, counted in horizontal
    /// syncs from the vertical sync edge.
    pub first_line: usize,
    /// Delay from the horizontal sync edge to the first overlay pixel, in
    /// nanoseconds.
    pub first_column: u32,
    /// Bytes of each plane shifted out per line.
    pub line_bytes: usize,
    /// Drawable area for this standard.
    pub bounds: Bounds,
}

impl StandardTiming {
    /// Offset of `line` within a framebuffer plane.
    pub fn line_offset(&self, line: usize) -> usize {
        line * BUFFER_WIDTH
    }
}

/// NTSC: 240 lines of 336 pixels.
pub static NTSC: StandardTiming = StandardTiming {
    standard: VideoStandard::Ntsc,
    visible_lines: 240,
    first_line: 20,
    first_column: 8_900,
    line_bytes: 42,
    bounds: Bounds::new(42 * 8 - 1, 240 - 1),
};

/// PAL: 266 lines of 352 pixels.
pub static PAL: StandardTiming = StandardTiming {
    standard: VideoStandard::Pal,
    visible_lines: 266,
    first_line: 24,
    first_column: 9_800,
    line_bytes: 44,
    bounds: Bounds::new(44 * 8 - 1, 266 - 1),
};

/// Before the first measurement nothing is streamed. Drawing still uses the
/// NTSC area so the composer has somewhere sensible to paint.
pub static UNKNOWN: StandardTiming = StandardTiming {
    standard: VideoStandard::Unknown,
    visible_lines: 0,
    first_line: 20,
    first_column: 8_900,
    line_bytes: 42,
    bounds: Bounds::new(42 * 8 - 1, 240 - 1),
};

/// A `VideoStandard` that can be shared between interrupt and thread code.
#[derive(Debug, Default)]
pub struct AtomicStandard(AtomicU8);

impl AtomicStandard {
    pub const fn new() -> Self {
        AtomicStandard(AtomicU8::new(VideoStandard::Unknown as u8))
    }

    pub fn load(&self) -> VideoStandard {
        VideoStandard::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn store(&self, s: VideoStandard) {
        self.0.store(s as u8, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_threshold() {
        assert_eq!(VideoStandard::classify(240, 270), VideoStandard::Ntsc);
        assert_eq!(VideoStandard::classify(262, 270), VideoStandard::Ntsc);
        assert_eq!(VideoStandard::classify(270, 270), VideoStandard::Ntsc);
        assert_eq!(VideoStandard::classify(271, 270), VideoStandard::Pal);
        assert_eq!(VideoStandard::classify(300, 270), VideoStandard::Pal);
        assert_eq!(VideoStandard::classify(312, 270), VideoStandard::Pal);
    }

    #[test]
    fn timing_fits_framebuffer() {
        for s in &[VideoStandard::Unknown, VideoStandard::Ntsc, VideoStandard::Pal] {
            let t = s.timing();
            assert_eq!(t.standard, *s);
            assert!(t.line_bytes <= BUFFER_WIDTH);
            assert!(t.visible_lines <= osd_gfx::BUFFER_HEIGHT);
            assert_eq!(t.bounds.width() as usize, t.line_bytes * 8);
        }
        assert_eq!(PAL.bounds, Bounds::new(351, 265));
        assert_eq!(NTSC.bounds, Bounds::new(335, 239));
    }

    #[test]
    fn atomic_standard_round_trips() {
        let a = AtomicStandard::new();
        assert_eq!(a.load(), VideoStandard::Unknown);
        a.store(VideoStandard::Pal);
        assert_eq!(a.load(), VideoStandard::Pal);
    }
}
