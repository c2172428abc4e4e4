//! Clipped drawing surface and the axis-aligned primitives.

use crate::fb::{FrameBuffer, Mode, Plane, BUFFER_HEIGHT, BUFFER_WIDTH, BUFFER_WIDTH_PX};
use crate::{Bounds, Endcap, OutlineStyle, Pen};

/// A framebuffer borrowed for drawing, restricted to a drawable rectangle.
///
/// Every operation on a `Canvas` checks its coordinates against the bounds
/// and quietly drops whatever falls outside. Nothing drawn through a `Canvas`
/// can panic or write outside the rectangle.
pub struct Canvas<'a> {
    pub(crate) fb: &'a mut FrameBuffer,
    pub(crate) bounds: Bounds,
}

/// Byte range and edge masks covering pixels `[a, b)` of a row.
#[derive(Copy, Clone, Debug)]
struct Span {
    first: usize,
    last: usize,
    left: u8,
    right: u8,
}

impl Span {
    /// Requires `a < b`.
    fn new(a: usize, b: usize) -> Self {
        let last_px = b - 1;
        Span {
            first: a / 8,
            last: last_px / 8,
            left: 0xFF >> (a % 8),
            right: 0xFF << (7 - last_px % 8),
        }
    }

    fn write(&self, fb: &mut FrameBuffer, plane: Plane, y: usize, mode: Mode) {
        let base = y * BUFFER_WIDTH;
        if self.first == self.last {
            // Island: both edges fall in one byte.
            fb.write(plane, base + self.first, self.left & self.right, mode);
        } else {
            fb.write(plane, base + self.first, self.left, mode);
            for i in self.first + 1..self.last {
                fb.write(plane, base + i, 0xFF, mode);
            }
            fb.write(plane, base + self.last, self.right, mode);
        }
    }
}

impl<'a> Canvas<'a> {
    /// Wraps `fb`. Bounds larger than the framebuffer are reduced to fit.
    pub fn new(fb: &'a mut FrameBuffer, bounds: Bounds) -> Self {
        let bounds = Bounds {
            right: bounds.right.min(BUFFER_WIDTH_PX as i32 - 1),
            bottom: bounds.bottom.min(BUFFER_HEIGHT as i32 - 1),
        };
        Canvas { fb, bounds }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Makes the whole framebuffer transparent, including any area outside
    /// the bounds.
    pub fn clear(&mut self) {
        self.fb.clear()
    }

    pub fn pixel(&mut self, x: i32, y: i32, pen: Pen) {
        if !self.bounds.contains(x, y) {
            return;
        }
        let (index, bit) = FrameBuffer::address_of(x as usize, y as usize);
        self.fb.write(Plane::Mask, index, bit, pen.mask);
        self.fb.write(Plane::Level, index, bit, pen.level);
    }

    pub fn pixel_plane(&mut self, x: i32, y: i32, plane: Plane, mode: Mode) {
        if !self.bounds.contains(x, y) {
            return;
        }
        let (index, bit) = FrameBuffer::address_of(x as usize, y as usize);
        self.fb.write(plane, index, bit, mode);
    }

    /// Clips the half-open span `[x0, x1)` (in either order) to the bounds.
    fn clip_span(&self, x0: i32, x1: i32) -> Option<Span> {
        let (a, b) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let a = a.max(0);
        let b = b.min(self.bounds.right + 1);
        if a < b {
            Some(Span::new(a as usize, b as usize))
        } else {
            None
        }
    }

    /// Clips the half-open range `[y0, y1)` (in either order) to the bounds.
    fn clip_rows(&self, y0: i32, y1: i32) -> Option<(usize, usize)> {
        let (a, b) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        let a = a.max(0);
        let b = b.min(self.bounds.bottom + 1);
        if a < b {
            Some((a as usize, b as usize))
        } else {
            None
        }
    }

    /// Draws pixels `[x0, x1)` of row `y` into one plane.
    pub fn hline_plane(&mut self, x0: i32, x1: i32, y: i32, plane: Plane, mode: Mode) {
        if y < 0 || y > self.bounds.bottom {
            return;
        }
        if let Some(span) = self.clip_span(x0, x1) {
            span.write(self.fb, plane, y as usize, mode);
        }
    }

    /// Draws pixels `[x0, x1)` of row `y`. The endpoints may be given in
    /// either order; equal endpoints draw nothing.
    pub fn hline(&mut self, x0: i32, x1: i32, y: i32, pen: Pen) {
        if y < 0 || y > self.bounds.bottom {
            return;
        }
        if let Some(span) = self.clip_span(x0, x1) {
            span.write(self.fb, Plane::Mask, y as usize, pen.mask);
            span.write(self.fb, Plane::Level, y as usize, pen.level);
        }
    }

    /// Draws pixels `[y0, y1)` of column `x` into one plane.
    pub fn vline_plane(&mut self, x: i32, y0: i32, y1: i32, plane: Plane, mode: Mode) {
        if x < 0 || x > self.bounds.right {
            return;
        }
        if let Some((a, b)) = self.clip_rows(y0, y1) {
            let (mut index, bit) = FrameBuffer::address_of(x as usize, a);
            for _ in a..b {
                self.fb.write(plane, index, bit, mode);
                index += BUFFER_WIDTH;
            }
        }
    }

    /// Draws pixels `[y0, y1)` of column `x`, in either order.
    pub fn vline(&mut self, x: i32, y0: i32, y1: i32, pen: Pen) {
        self.vline_plane(x, y0, y1, Plane::Mask, pen.mask);
        self.vline_plane(x, y0, y1, Plane::Level, pen.level);
    }

    fn hline_endcap(&mut self, endcap: Endcap, x: i32, y: i32, stroke: Pen) {
        match endcap {
            Endcap::None => (),
            Endcap::Round => self.pixel(x, y, stroke),
            Endcap::Flat => self.vline(x, y - 1, y + 2, stroke),
        }
    }

    fn vline_endcap(&mut self, endcap: Endcap, x: i32, y: i32, stroke: Pen) {
        match endcap {
            Endcap::None => (),
            Endcap::Round => self.pixel(x, y, stroke),
            Endcap::Flat => self.hline(x - 1, x + 2, y, stroke),
        }
    }

    /// Draws a three-pixel-thick horizontal line from `x0` to `x1`
    /// inclusive, centered on row `y`. The border rows go down first in the
    /// stroke level, then the center row in the fill level.
    pub fn hline_outlined(
        &mut self,
        x0: i32,
        x1: i32,
        y: i32,
        endcaps: (Endcap, Endcap),
        style: OutlineStyle,
        mask_mode: Mode,
    ) {
        let (stroke, fill) = style.pens(mask_mode);
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        self.hline(x0 + 1, x1, y - 1, stroke);
        self.hline(x0 + 1, x1, y + 1, stroke);
        self.hline(x0 + 1, x1, y, fill);
        self.hline_endcap(endcaps.0, x0, y, stroke);
        self.hline_endcap(endcaps.1, x1, y, stroke);
    }

    /// Vertical counterpart of `hline_outlined`.
    pub fn vline_outlined(
        &mut self,
        x: i32,
        y0: i32,
        y1: i32,
        endcaps: (Endcap, Endcap),
        style: OutlineStyle,
        mask_mode: Mode,
    ) {
        let (stroke, fill) = style.pens(mask_mode);
        let (y0, y1) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        self.vline(x - 1, y0 + 1, y1, stroke);
        self.vline(x + 1, y0 + 1, y1, stroke);
        self.vline(x, y0 + 1, y1, fill);
        self.vline_endcap(endcaps.0, x, y0, stroke);
        self.vline_endcap(endcaps.1, x, y1, stroke);
    }

    /// Fills pixels `[x, x + w) × [y, y + h)`. Empty or negative sizes draw
    /// nothing.
    pub fn filled_rectangle(&mut self, x: i32, y: i32, w: i32, h: i32, pen: Pen) {
        if w <= 0 || h <= 0 {
            return;
        }
        let span = match self.clip_span(x, x.saturating_add(w)) {
            Some(s) => s,
            None => return,
        };
        if let Some((a, b)) = self.clip_rows(y, y.saturating_add(h)) {
            for row in a..b {
                span.write(self.fb, Plane::Mask, row, pen.mask);
                span.write(self.fb, Plane::Level, row, pen.level);
            }
        }
    }

    /// Outlines the rectangle with corners `(x, y)` and `(x + w, y + h)`.
    pub fn rectangle_outlined(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        style: OutlineStyle,
        mask_mode: Mode,
    ) {
        let caps = (Endcap::Round, Endcap::Round);
        self.hline_outlined(x, x + w, y, caps, style, mask_mode);
        self.hline_outlined(x, x + w, y + h, caps, style, mask_mode);
        self.vline_outlined(x, y, y + h, caps, style, mask_mode);
        self.vline_outlined(x + w, y, y + h, caps, style, mask_mode);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fb::BUFFER_SIZE;
    use proptest::prelude::*;

    pub(crate) const PAL: Bounds = Bounds::new(351, 265);
    pub(crate) const NTSC: Bounds = Bounds::new(335, 239);

    /// A framebuffer full of junk, so clears and toggles are visible.
    pub(crate) fn patterned() -> Box<FrameBuffer> {
        let mut fb = Box::new(FrameBuffer::new());
        for (i, b) in fb.plane_mut(Plane::Mask).iter_mut().enumerate() {
            *b = (i * 37 + 11) as u8;
        }
        for (i, b) in fb.plane_mut(Plane::Level).iter_mut().enumerate() {
            *b = (i * 101 + 3) as u8;
        }
        fb
    }

    pub(crate) fn same(a: &FrameBuffer, b: &FrameBuffer) -> bool {
        a.plane(Plane::Mask)[..] == b.plane(Plane::Mask)[..]
            && a.plane(Plane::Level)[..] == b.plane(Plane::Level)[..]
    }

    fn mode() -> impl Strategy<Value = Mode> {
        prop_oneof![Just(Mode::Clear), Just(Mode::Set), Just(Mode::Toggle)]
    }

    #[test]
    fn pixel_touches_exactly_one_bit_per_plane() {
        let modes = [Mode::Clear, Mode::Set, Mode::Toggle];
        for &m in &modes {
            for &l in &modes {
                for &(x, y) in &[(0, 0), (7, 3), (8, 3), (100, 200), (351, 265)] {
                    let mut fb = patterned();
                    let before = patterned();
                    Canvas::new(&mut fb, PAL).pixel(x, y, Pen::new(m, l));

                    let (index, bit) = FrameBuffer::address_of(x as usize, y as usize);
                    for i in 0..BUFFER_SIZE {
                        let expect = |plane, mode: Mode| {
                            let old = before.plane(plane)[i];
                            if i == index {
                                mode.apply(old, bit)
                            } else {
                                old
                            }
                        };
                        assert_eq!(fb.plane(Plane::Mask)[i], expect(Plane::Mask, m));
                        assert_eq!(fb.plane(Plane::Level)[i], expect(Plane::Level, l));
                    }
                }
            }
        }
    }

    #[test]
    fn out_of_bounds_pixels_are_ignored() {
        let mut fb = patterned();
        let before = patterned();
        {
            let mut c = Canvas::new(&mut fb, NTSC);
            for &(x, y) in &[(-1, 0), (0, -1), (336, 0), (0, 240), (351, 265), (-5, 500)] {
                c.pixel(x, y, Pen::WHITE);
                c.pixel(x, y, Pen::new(Mode::Toggle, Mode::Toggle));
                c.pixel_plane(x, y, Plane::Level, Mode::Clear);
            }
        }
        assert!(same(&fb, &before));
    }

    #[test]
    fn zero_length_spans_are_no_ops() {
        let mut fb = patterned();
        let before = patterned();
        {
            let mut c = Canvas::new(&mut fb, PAL);
            c.hline(10, 10, 5, Pen::new(Mode::Toggle, Mode::Toggle));
            c.vline(10, 5, 5, Pen::new(Mode::Toggle, Mode::Toggle));
            c.filled_rectangle(3, 3, 0, 10, Pen::WHITE);
            c.filled_rectangle(3, 3, 10, -1, Pen::WHITE);
        }
        assert!(same(&fb, &before));
    }

    #[test]
    fn island_span() {
        let mut fb = Box::new(FrameBuffer::new());
        Canvas::new(&mut fb, PAL).hline(10, 13, 0, Pen::WHITE);
        assert_eq!(fb.plane(Plane::Mask)[1], 0b0011_1000);
        assert_eq!(fb.plane(Plane::Mask)[0], 0);
        assert_eq!(fb.plane(Plane::Mask)[2], 0);
    }

    #[test]
    fn outlined_hline_layout() {
        let mut fb = Box::new(FrameBuffer::new());
        Canvas::new(&mut fb, PAL).hline_outlined(
            10,
            20,
            50,
            (Endcap::Flat, Endcap::Round),
            OutlineStyle::BlackOutline,
            Mode::Set,
        );
        // Body is white, borders are black, all opaque.
        for x in 11..20 {
            assert!(fb.get(Plane::Mask, x, 50) && fb.get(Plane::Level, x, 50));
            assert!(fb.get(Plane::Mask, x, 49) && !fb.get(Plane::Level, x, 49));
            assert!(fb.get(Plane::Mask, x, 51) && !fb.get(Plane::Level, x, 51));
        }
        // Flat cap spans three rows, round cap is a single pixel.
        for y in 49..52 {
            assert!(fb.get(Plane::Mask, 10, y) && !fb.get(Plane::Level, 10, y));
        }
        assert!(fb.get(Plane::Mask, 20, 50) && !fb.get(Plane::Level, 20, 50));
        assert!(!fb.get(Plane::Mask, 20, 49));
        assert!(!fb.get(Plane::Mask, 20, 51));
    }

    /// Checks `(mask, level)` for the first three bytes of rows `0..10`
    /// against `expect`, and that every other byte is clear.
    fn assert_corner(fb: &FrameBuffer, expect: &[[(u8, u8); 3]; 10]) {
        for i in 0..BUFFER_SIZE {
            let (row, col) = (i / BUFFER_WIDTH, i % BUFFER_WIDTH);
            let want = if row < 10 && col < 3 {
                expect[row][col]
            } else {
                (0, 0)
            };
            let got = (fb.plane(Plane::Mask)[i], fb.plane(Plane::Level)[i]);
            assert_eq!(got, want, "row {} byte {}", row, col);
        }
    }

    #[test]
    fn outlined_vline_endcaps() {
        let body = [(0, 0), (0xE0, 0x40), (0, 0)];
        let none = [(0, 0); 3];
        let round = [(0, 0), (0x40, 0), (0, 0)];
        let flat = [(0, 0), (0xE0, 0), (0, 0)];
        for &(caps, top, bottom) in &[
            ((Endcap::None, Endcap::None), none, none),
            ((Endcap::Round, Endcap::Round), round, round),
            ((Endcap::Flat, Endcap::Flat), flat, flat),
            ((Endcap::Flat, Endcap::Round), flat, round),
        ] {
            let mut fb = Box::new(FrameBuffer::new());
            // Endpoints reversed: the first cap still goes on the top end.
            Canvas::new(&mut fb, PAL).vline_outlined(
                9,
                6,
                2,
                caps,
                OutlineStyle::BlackOutline,
                Mode::Set,
            );
            let mut expect = [none; 10];
            expect[2] = top;
            expect[3] = body;
            expect[4] = body;
            expect[5] = body;
            expect[6] = bottom;
            assert_corner(&fb, &expect);
        }
    }

    #[test]
    fn outlined_rectangle_layout() {
        let mut fb = Box::new(FrameBuffer::new());
        Canvas::new(&mut fb, PAL).rectangle_outlined(
            8,
            2,
            8,
            5,
            OutlineStyle::BlackOutline,
            Mode::Set,
        );
        // Columns 7..=17 span bytes 0 (bit 0), 1 and 2 (top two bits). The
        // sides go down after the top and bottom, so their fill wins where
        // they cross the horizontal borders.
        let clear = [(0, 0); 3];
        let border = [(0, 0), (0x7F, 0), (0, 0)];
        let edge = [(0, 0), (0xFF, 0x7F), (0x80, 0)];
        let crossing = [(0x01, 0), (0xFF, 0x80), (0xC0, 0x80)];
        let sides = [(0x01, 0), (0xC1, 0x80), (0xC0, 0x80)];
        assert_corner(
            &fb,
            &[
                clear, border, edge, crossing, sides, sides, crossing, edge, border, clear,
            ],
        );
    }

    proptest! {
        #[test]
        fn hline_matches_per_pixel_loop(
            x0 in -20i32..380,
            x1 in -20i32..380,
            y in -3i32..270,
            m in mode(),
            l in mode(),
        ) {
            let pen = Pen::new(m, l);
            let mut fast = patterned();
            Canvas::new(&mut fast, PAL).hline(x0, x1, y, pen);

            let mut slow = patterned();
            {
                let mut c = Canvas::new(&mut slow, PAL);
                for x in x0.min(x1)..x0.max(x1) {
                    c.pixel(x, y, pen);
                }
            }
            prop_assert!(same(&fast, &slow));
        }

        #[test]
        fn vline_matches_per_pixel_loop(
            x in -3i32..360,
            y0 in -20i32..290,
            y1 in -20i32..290,
            m in mode(),
        ) {
            let mut fast = patterned();
            Canvas::new(&mut fast, NTSC).vline_plane(x, y0, y1, Plane::Level, m);

            let mut slow = patterned();
            {
                let mut c = Canvas::new(&mut slow, NTSC);
                for y in y0.min(y1)..y0.max(y1) {
                    c.pixel_plane(x, y, Plane::Level, m);
                }
            }
            prop_assert!(same(&fast, &slow));
        }

        #[test]
        fn filled_rectangle_matches_rows_of_hlines(
            x in -30i32..370,
            y in -30i32..280,
            w in -5i32..120,
            h in -5i32..60,
            m in mode(),
            l in mode(),
        ) {
            let pen = Pen::new(m, l);
            let mut rect = patterned();
            Canvas::new(&mut rect, PAL).filled_rectangle(x, y, w, h, pen);

            let mut rows = patterned();
            if w > 0 && h > 0 {
                let mut c = Canvas::new(&mut rows, PAL);
                for row in y..y + h {
                    c.hline(x, x + w, row, pen);
                }
            }
            prop_assert!(same(&rect, &rows));
        }
    }
}
