//! Circles, ellipses, arbitrary lines and polygons.

use core::mem::swap;

#[cfg(not(any(test, feature = "std")))]
use libm::F32Ext;

use crate::canvas::Canvas;
use crate::fb::{Mode, Plane};
use crate::{OutlineStyle, Pen, Point};

/// Neighbourhood used for the stroke pass of `circle_outlined`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Border {
    /// Left, right, above and below each boundary pixel.
    Four,
    /// As `Four`, plus the two outward diagonals.
    Eight,
}

/// Walks one octant of the midpoint circle of radius `r`, starting at
/// `(r, 0)` and stepping `y` until the walk crosses the diagonal.
fn midpoint_octant(r: i32, mut f: impl FnMut(i32, i32)) {
    let mut error = -r;
    let mut x = r;
    let mut y = 0;
    while x >= y {
        f(x, y);
        error += y * 2 + 1;
        y += 1;
        if error >= 0 {
            x -= 1;
            error -= x * 2;
        }
    }
}

/// Dash gate shared by the circle variants. A period of zero disables
/// dashing.
#[inline]
fn dash_on(step: i32, period: i32) -> bool {
    period <= 0 || step % period < period / 2
}

/// Integer Bresenham walk between two points.
///
/// The endpoint with the larger major-axis coordinate is not visited, so a
/// line from a point to itself visits nothing.
fn bresenham(x0: i32, y0: i32, x1: i32, y1: i32, mut f: impl FnMut(i32, i32)) {
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    let (mut x0, mut y0, mut x1, mut y1) = if steep {
        (y0, x0, y1, x1)
    } else {
        (x0, y0, x1, y1)
    };
    if x0 > x1 {
        swap(&mut x0, &mut x1);
        swap(&mut y0, &mut y1);
    }
    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let ystep = if y0 < y1 { 1 } else { -1 };
    let mut error = dx / 2;
    let mut y = y0;
    for x in x0..x1 {
        if steep {
            f(y, x)
        } else {
            f(x, y)
        }
        error -= dy;
        if error < 0 {
            y += ystep;
            error += dx;
        }
    }
}

/// Dot counter for dashed lines. Each pass over a line gets a fresh one, so
/// the stroke and fill passes stay in phase.
struct Dasher {
    dots: u32,
    count: u32,
    draw: u32,
}

impl Dasher {
    fn new(dots: u32) -> Self {
        Dasher {
            dots,
            count: 0,
            draw: 1,
        }
    }

    fn next(&mut self) -> bool {
        if self.dots != 0 {
            if self.count % self.dots == 0 {
                self.draw += 1;
            }
            self.count += 1;
        }
        self.draw % 2 == 1
    }
}

/// Sine and cosine of an angle given in degrees.
fn sin_cos_deg(angle: f32) -> (f32, f32) {
    let rad = angle * (core::f32::consts::PI / 180.);
    (rad.sin(), rad.cos())
}

fn rotate(p: Point, (sin, cos): (f32, f32)) -> (i32, i32) {
    let (x, y) = (f32::from(p.x), f32::from(p.y));
    ((cos * x - sin * y).round() as i32, (sin * x + cos * y).round() as i32)
}

impl<'a> Canvas<'a> {
    fn plot8(&mut self, cx: i32, cy: i32, x: i32, y: i32, pen: Pen) {
        self.pixel(cx + x, cy + y, pen);
        self.pixel(cx + x, cy - y, pen);
        self.pixel(cx - x, cy + y, pen);
        self.pixel(cx - x, cy - y, pen);
        self.pixel(cx + y, cy + x, pen);
        self.pixel(cx + y, cy - x, pen);
        self.pixel(cx - y, cy + x, pen);
        self.pixel(cx - y, cy - x, pen);
    }

    fn plot4(&mut self, cx: i32, cy: i32, x: i32, y: i32, pen: Pen) {
        self.pixel(cx + x, cy + y, pen);
        self.pixel(cx - x, cy + y, pen);
        self.pixel(cx - x, cy - y, pen);
        self.pixel(cx + x, cy - y, pen);
    }

    /// Draws the outline of a circle, optionally dashed with a period of
    /// `dash_period` steps. Nothing is drawn if the center is off the canvas.
    pub fn circle(&mut self, cx: i32, cy: i32, r: i32, dash_period: i32, pen: Pen) {
        if !self.bounds.contains(cx, cy) {
            return;
        }
        midpoint_octant(r, |x, y| {
            if dash_on(y, dash_period) {
                self.plot8(cx, cy, x, y, pen);
            }
        });
    }

    /// Draws a circle whose boundary is bordered on both sides in the stroke
    /// level, then overdrawn in the fill level.
    pub fn circle_outlined(
        &mut self,
        cx: i32,
        cy: i32,
        r: i32,
        dash_period: i32,
        border: Border,
        style: OutlineStyle,
        mask_mode: Mode,
    ) {
        if !self.bounds.contains(cx, cy) {
            return;
        }
        let (stroke, fill) = style.pens(mask_mode);
        midpoint_octant(r, |x, y| {
            if dash_on(y, dash_period) {
                self.plot8(cx, cy, x + 1, y, stroke);
                self.plot8(cx, cy, x, y + 1, stroke);
                self.plot8(cx, cy, x - 1, y, stroke);
                self.plot8(cx, cy, x, y - 1, stroke);
                if border == Border::Eight {
                    self.plot8(cx, cy, x + 1, y + 1, stroke);
                    self.plot8(cx, cy, x - 1, y - 1, stroke);
                }
            }
        });
        midpoint_octant(r, |x, y| {
            if dash_on(y, dash_period) {
                self.plot8(cx, cy, x, y, fill);
            }
        });
    }

    fn circle_rows(&mut self, cx: i32, cy: i32, dy: i32, half_width: i32, pen: Pen) {
        self.hline(cx - half_width, cx + half_width + 1, cy + dy, pen);
        if dy != 0 {
            self.hline(cx - half_width, cx + half_width + 1, cy - dy, pen);
        }
    }

    /// Fills a circle with horizontal spans.
    ///
    /// Every row of the disc is written exactly once, at its full width, so
    /// `Toggle` inverts the disc cleanly.
    pub fn circle_filled(&mut self, cx: i32, cy: i32, r: i32, pen: Pen) {
        if !self.bounds.contains(cx, cy) || r < 0 {
            return;
        }
        let mut error = -r;
        let mut x = r;
        let mut y = 0;
        while x >= y {
            self.circle_rows(cx, cy, y, x, pen);
            error += y * 2 + 1;
            y += 1;
            if error >= 0 {
                // Rows `x` away from the center are as wide as they get. The
                // diagonal row was already covered above.
                if x >= y {
                    self.circle_rows(cx, cy, x, y - 1, pen);
                }
                x -= 1;
                error -= x * 2;
            }
        }
    }

    /// Draws the outline of an axis-aligned ellipse with horizontal radius
    /// `rh` and vertical radius `rv`.
    pub fn ellipse(&mut self, cx: i32, cy: i32, rh: i32, rv: i32, pen: Pen) {
        if rh < 0 || rv < 0 {
            return;
        }
        if rv == 0 {
            self.hline(cx - rh, cx + rh + 1, cy, pen);
            return;
        }
        if rh == 0 {
            self.vline(cx, cy - rv, cy + rv + 1, pen);
            return;
        }
        let a2 = i64::from(rh) * i64::from(rh);
        let b2 = i64::from(rv) * i64::from(rv);
        let mut x = 0i64;
        let mut y = i64::from(rv);
        let mut dx = 0i64;
        let mut dy = 2 * a2 * y;

        // Region 1: slope shallower than -1, step x.
        let mut err = b2 - a2 * y + b2 / 4;
        self.plot4(cx, cy, x as i32, y as i32, pen);
        while dy >= dx {
            x += 1;
            dx += 2 * b2;
            err += dx + b2;
            if err >= 0 {
                y -= 1;
                dy -= 2 * a2;
                err -= dy;
            }
            self.plot4(cx, cy, x as i32, y as i32, pen);
        }

        // Region 2: slope steeper than -1, step y. The decision value is
        // evaluated at (x + 1/2, y - 1), scaled by 4 and truncated.
        err = (4 * (b2 * (x * x + x) + a2 * (y - 1) * (y - 1) - a2 * b2) + b2) / 4;
        while y > 0 {
            y -= 1;
            dy -= 2 * a2;
            err += a2 - dy;
            if err <= 0 {
                x += 1;
                dx += 2 * b2;
                err += dx;
            }
            self.plot4(cx, cy, x as i32, y as i32, pen);
        }
    }

    /// Draws a one-pixel line into a single plane.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, plane: Plane, mode: Mode) {
        bresenham(x0, y0, x1, y1, |x, y| self.pixel_plane(x, y, plane, mode));
    }

    /// Draws a one-pixel line into both planes.
    pub fn line_lm(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, pen: Pen) {
        bresenham(x0, y0, x1, y1, |x, y| self.pixel(x, y, pen));
    }

    fn plot_cross(&mut self, x: i32, y: i32, pen: Pen) {
        self.pixel(x - 1, y, pen);
        self.pixel(x + 1, y, pen);
        self.pixel(x, y - 1, pen);
        self.pixel(x, y + 1, pen);
    }

    /// Draws a line with a one-pixel border on all four sides of every body
    /// pixel.
    pub fn line_outlined(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        style: OutlineStyle,
        mask_mode: Mode,
    ) {
        self.line_outlined_dashed(x0, y0, x1, y1, style, mask_mode, 0);
    }

    /// Like `line_outlined`, but alternates runs of `dots` drawn and skipped
    /// pixels. The border and body are gated identically so their dashes
    /// line up. A `dots` of zero draws a solid line.
    pub fn line_outlined_dashed(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        style: OutlineStyle,
        mask_mode: Mode,
        dots: u32,
    ) {
        let (stroke, fill) = style.pens(mask_mode);

        let mut dash = Dasher::new(dots);
        bresenham(x0, y0, x1, y1, |x, y| {
            if dash.next() {
                self.plot_cross(x, y, stroke);
            }
        });

        let mut dash = Dasher::new(dots);
        bresenham(x0, y0, x1, y1, |x, y| {
            if dash.next() {
                self.pixel(x, y, fill);
            }
        });
    }

    /// Draws a closed outlined polygon.
    ///
    /// `points` are offsets from `(cx, cy)` and are rotated by `angle`
    /// degrees before drawing. Outlined edges go down first, then the bare
    /// edges are overdrawn in the fill level so that vertices where borders
    /// overlap stay legible.
    pub fn polygon(
        &mut self,
        cx: i32,
        cy: i32,
        angle: f32,
        points: &[Point],
        style: OutlineStyle,
        mask_mode: Mode,
    ) {
        let rot = sin_cos_deg(angle);
        let (_, fill) = style.pens(mask_mode);
        let n = points.len();
        for i in 0..n {
            let (ax, ay) = rotate(points[i], rot);
            let (bx, by) = rotate(points[(i + 1) % n], rot);
            self.line_outlined(cx + ax, cy + ay, cx + bx, cy + by, style, mask_mode);
        }
        for i in 0..n {
            let (ax, ay) = rotate(points[i], rot);
            let (bx, by) = rotate(points[(i + 1) % n], rot);
            self.line_lm(cx + ax, cy + ay, cx + bx, cy + by, fill);
        }
    }

    /// Draws a closed polygon with one-pixel edges.
    pub fn polygon_simple(&mut self, cx: i32, cy: i32, angle: f32, points: &[Point], pen: Pen) {
        let rot = sin_cos_deg(angle);
        let n = points.len();
        for i in 0..n {
            let (ax, ay) = rotate(points[i], rot);
            let (bx, by) = rotate(points[(i + 1) % n], rot);
            self.line_lm(cx + ax, cy + ay, cx + bx, cy + by, pen);
        }
    }

    /// Draws an arrowhead pointing along `angle` degrees (zero is up,
    /// increasing clockwise), about four times `size_quarter` long.
    pub fn arrow(&mut self, x: i32, y: i32, angle: f32, size_quarter: i32, pen: Pen) {
        let (sin, cos) = sin_cos_deg(angle);
        let q = size_quarter as f32;
        let peak_x = (sin * q * 2.) as i32;
        let peak_y = (cos * q * 2.) as i32;
        let end_x = (cos * q) as i32;
        let end_y = (sin * q) as i32;

        let (tip_x, tip_y) = (x + peak_x, y - peak_y);
        let (l_x, l_y) = (x - peak_x - end_x, y + peak_y - end_y);
        let (r_x, r_y) = (x - peak_x + end_x, y + peak_y + end_y);

        self.line_lm(tip_x, tip_y, l_x, l_y, pen);
        self.line_lm(tip_x, tip_y, r_x, r_y, pen);
        self.line_lm(x, y, l_x, l_y, pen);
        self.line_lm(x, y, r_x, r_y, pen);
    }

    /// Draws the one-pixel outline of the box with corners `(x0, y0)` and
    /// `(x1, y1)`, inclusive.
    pub fn draw_box(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, pen: Pen) {
        self.line_lm(x0, y0, x1, y0, pen);
        self.line_lm(x0, y0, x0, y1, pen);
        self.line_lm(x1, y0, x1, y1, pen);
        self.line_lm(x0, y1, x1, y1, pen);
        self.pixel(x0.max(x1), y0.max(y1), pen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::tests::{patterned, same, PAL};
    use crate::fb::FrameBuffer;

    fn blank() -> Box<FrameBuffer> {
        Box::new(FrameBuffer::new())
    }

    /// Pixel model for checking drawing results against hand-derived
    /// expectations.
    struct Model {
        mask: [[bool; 32]; 32],
        level: [[bool; 32]; 32],
    }

    impl Model {
        fn new() -> Self {
            Model {
                mask: [[false; 32]; 32],
                level: [[false; 32]; 32],
            }
        }

        fn set(&mut self, x: i32, y: i32, level: bool) {
            self.mask[y as usize][x as usize] = true;
            self.level[y as usize][x as usize] = level;
        }

        fn check(&self, fb: &FrameBuffer) {
            for y in 0..32 {
                for x in 0..32 {
                    assert_eq!(fb.get(Plane::Mask, x, y), self.mask[y][x], "mask ({}, {})", x, y);
                    assert_eq!(fb.get(Plane::Level, x, y), self.level[y][x], "level ({}, {})", x, y);
                }
            }
        }
    }

    /// First octant of the midpoint circle with r = 5, worked by hand:
    ///
    /// ```text
    /// err  x  y
    ///  -5  5  0   -> err -4, y 1
    ///  -4  5  1   -> err -1, y 2
    ///  -1  5  2   -> err  4, y 3, x 4, err -4
    ///  -4  4  3   -> err  3, y 4, x 3, err -3; 3 < 4, stop
    /// ```
    const R5_OCTANT: [(i32, i32); 4] = [(5, 0), (5, 1), (5, 2), (4, 3)];

    fn eight(x: i32, y: i32) -> [(i32, i32); 8] {
        [(x, y), (x, -y), (-x, y), (-x, -y), (y, x), (y, -x), (-y, x), (-y, -x)]
    }

    #[test]
    fn filled_then_outlined_circle_matches_hand_walk() {
        let (cx, cy) = (10, 10);
        let mut fb = blank();
        {
            let mut c = Canvas::new(&mut fb, PAL);
            c.circle_filled(cx, cy, 5, Pen::new(Mode::Set, Mode::Set));
            c.circle_outlined(cx, cy, 5, 0, Border::Four, OutlineStyle::BlackOutline, Mode::Set);
        }

        let mut model = Model::new();
        // Disc: each row spans the widest symmetric point on it.
        let mut half = [-1i32; 6];
        for &(x, y) in &R5_OCTANT {
            half[y as usize] = half[y as usize].max(x);
            half[x as usize] = half[x as usize].max(y);
        }
        assert_eq!(half, [5, 5, 5, 4, 3, 2]);
        for dy in 0..6i32 {
            for dx in -half[dy as usize]..=half[dy as usize] {
                model.set(cx + dx, cy + dy, true);
                model.set(cx + dx, cy - dy, true);
            }
        }
        // Stroke ring, then the boundary itself in fill.
        for &(x, y) in &R5_OCTANT {
            for &(nx, ny) in &[(x + 1, y), (x, y + 1), (x - 1, y), (x, y - 1)] {
                for &(px, py) in &eight(nx, ny) {
                    model.set(cx + px, cy + py, false);
                }
            }
        }
        for &(x, y) in &R5_OCTANT {
            for &(px, py) in &eight(x, y) {
                model.set(cx + px, cy + py, true);
            }
        }
        model.check(&fb);
    }

    #[test]
    fn filled_circle_toggles_cleanly() {
        for r in 0..20 {
            let mut fb = patterned();
            {
                let mut c = Canvas::new(&mut fb, PAL);
                let t = Pen::new(Mode::Toggle, Mode::Toggle);
                c.circle_filled(100, 100, r, t);
                c.circle_filled(100, 100, r, t);
            }
            assert!(same(&fb, &patterned()), "r = {}", r);

            let mut toggled = blank();
            let mut set = blank();
            Canvas::new(&mut toggled, PAL).circle_filled(50, 50, r, Pen::new(Mode::Toggle, Mode::Toggle));
            Canvas::new(&mut set, PAL).circle_filled(50, 50, r, Pen::WHITE);
            assert!(same(&toggled, &set), "r = {}", r);
        }
    }

    #[test]
    fn circles_with_off_canvas_center_are_skipped() {
        let mut fb = blank();
        {
            let mut c = Canvas::new(&mut fb, PAL);
            c.circle(-1, 10, 5, 0, Pen::WHITE);
            c.circle_filled(10, 266, 5, Pen::WHITE);
            c.circle_outlined(352, 10, 5, 0, Border::Eight, OutlineStyle::BlackOutline, Mode::Set);
        }
        assert!(same(&fb, &blank()));
    }

    #[test]
    fn dashed_circle_skips_steps() {
        let mut fb = blank();
        Canvas::new(&mut fb, PAL).circle(100, 100, 20, 4, Pen::WHITE);
        // Steps 0 and 1 are drawn, 2 and 3 are not.
        assert!(fb.get(Plane::Mask, 120, 100));
        assert!(fb.get(Plane::Mask, 120, 101));
        assert!(!fb.get(Plane::Mask, 120, 102));
        assert!(!fb.get(Plane::Mask, 120, 103));
        assert!(fb.get(Plane::Mask, 119, 104) || fb.get(Plane::Mask, 120, 104));
    }

    #[test]
    fn ellipse_reaches_its_extremes_symmetrically() {
        for &(rh, rv) in &[(10, 5), (5, 10), (3, 3), (20, 7), (1, 8), (6, 0)] {
            let (cx, cy) = (100i32, 100i32);
            let mut fb = blank();
            Canvas::new(&mut fb, PAL).ellipse(cx, cy, rh, rv, Pen::WHITE);
            for &(x, y) in &[(cx + rh, cy), (cx - rh, cy), (cx, cy + rv), (cx, cy - rv)] {
                assert!(fb.get(Plane::Mask, x as usize, y as usize), "{}x{} misses ({}, {})", rh, rv, x, y);
            }
            for y in cy - rv - 2..=cy + rv + 2 {
                for x in cx - rh - 2..=cx + rh + 2 {
                    let here = fb.get(Plane::Mask, x as usize, y as usize);
                    let mx = (2 * cx - x) as usize;
                    let my = (2 * cy - y) as usize;
                    assert_eq!(here, fb.get(Plane::Mask, mx, y as usize));
                    assert_eq!(here, fb.get(Plane::Mask, x as usize, my));
                    if (x - cx).abs() > rh || (y - cy).abs() > rv {
                        assert!(!here);
                    }
                }
            }
        }
    }

    #[test]
    fn ellipse_walk_matches_hand_trace() {
        // One quadrant of rh=5, rv=3: region 1 visits x=0..=4 and region 2
        // closes from (4, 1) down to (5, 0).
        let quadrant = [(0, 3), (1, 3), (2, 2), (3, 2), (4, 1), (5, 0)];
        let (cx, cy) = (50i32, 40i32);
        let mut fb = blank();
        Canvas::new(&mut fb, PAL).ellipse(cx, cy, 5, 3, Pen::WHITE);

        let mut expected = std::collections::BTreeSet::new();
        for &(x, y) in &quadrant {
            for &(sx, sy) in &[(1, 1), (-1, 1), (-1, -1), (1, -1)] {
                expected.insert((cx + sx * x, cy + sy * y));
            }
        }
        let mut lit = std::collections::BTreeSet::new();
        for y in cy - 6..=cy + 6 {
            for x in cx - 8..=cx + 8 {
                if fb.get(Plane::Mask, x as usize, y as usize) {
                    assert!(fb.get(Plane::Level, x as usize, y as usize));
                    lit.insert((x, y));
                }
            }
        }
        assert_eq!(lit, expected);
    }

    #[test]
    fn degenerate_ellipse_is_a_line() {
        let mut fb = blank();
        Canvas::new(&mut fb, PAL).ellipse(30, 30, 0, 4, Pen::WHITE);
        for y in 20..40 {
            assert_eq!(fb.get(Plane::Mask, 30, y), (26..=34).contains(&y), "row {}", y);
            assert!(!fb.get(Plane::Mask, 29, y));
            assert!(!fb.get(Plane::Mask, 31, y));
        }
    }

    #[test]
    fn line_excludes_far_endpoint() {
        let mut fb = blank();
        Canvas::new(&mut fb, PAL).line_lm(10, 20, 15, 20, Pen::WHITE);
        for x in 10..15 {
            assert!(fb.get(Plane::Mask, x, 20) && fb.get(Plane::Level, x, 20));
        }
        assert!(!fb.get(Plane::Mask, 15, 20));
        assert!(!fb.get(Plane::Mask, 9, 20));
    }

    #[test]
    fn steep_line_has_one_pixel_per_row() {
        let mut fb = blank();
        Canvas::new(&mut fb, PAL).line(40, 10, 45, 40, Plane::Mask, Mode::Set);
        for y in 10..40 {
            let n = (30..60).filter(|&x| fb.get(Plane::Mask, x, y)).count();
            assert_eq!(n, 1, "row {}", y);
        }
        assert!(fb.get(Plane::Mask, 40, 10));
        assert!(fb.plane(Plane::Level).iter().all(|&b| b == 0));
    }

    #[test]
    fn dashed_outline_stays_in_phase() {
        let mut fb = blank();
        Canvas::new(&mut fb, PAL).line_outlined_dashed(
            10,
            50,
            20,
            50,
            OutlineStyle::BlackOutline,
            Mode::Set,
            2,
        );
        let drawn = [12, 13, 16, 17];
        for x in 5..25 {
            let body = drawn.contains(&x);
            assert_eq!(fb.get(Plane::Level, x, 50), body, "body at {}", x);
            assert_eq!(fb.get(Plane::Mask, x, 49), body, "border above {}", x);
            assert_eq!(fb.get(Plane::Mask, x, 51), body, "border below {}", x);
        }
        // Side borders of each dash.
        for &x in &[11, 14, 15, 18] {
            assert!(fb.get(Plane::Mask, x, 50) && !fb.get(Plane::Level, x, 50));
        }
    }

    #[test]
    fn polygon_rotates_about_pivot() {
        let mut fb = blank();
        let pts = [Point::new(10, 0), Point::new(0, 0)];
        Canvas::new(&mut fb, PAL).polygon_simple(50, 50, 90., &pts, Pen::WHITE);
        // (10, 0) rotated a quarter turn lands at (0, 10).
        for y in 50..60 {
            assert!(fb.get(Plane::Mask, 50, y), "y = {}", y);
        }
        assert!(!fb.get(Plane::Mask, 60, 50));
        assert!(!fb.get(Plane::Mask, 51, 55));
    }

    #[test]
    fn outlined_polygon_has_white_edges_and_black_border() {
        let mut fb = blank();
        let square = [
            Point::new(-10, -10),
            Point::new(10, -10),
            Point::new(10, 10),
            Point::new(-10, 10),
        ];
        Canvas::new(&mut fb, PAL).polygon(100, 100, 0., &square, OutlineStyle::BlackOutline, Mode::Set);
        // Top edge body and the border rows either side of it.
        for x in 91..110 {
            assert!(fb.get(Plane::Level, x, 90));
            assert!(fb.get(Plane::Mask, x, 89) && !fb.get(Plane::Level, x, 89));
            assert!(fb.get(Plane::Mask, x, 91) && !fb.get(Plane::Level, x, 91));
        }
        // Interior is untouched.
        assert!(!fb.get(Plane::Mask, 100, 100));
    }

    #[test]
    fn box_is_closed() {
        let mut fb = blank();
        Canvas::new(&mut fb, PAL).draw_box(10, 10, 20, 15, Pen::BLACK);
        for x in 10..=20 {
            assert!(fb.get(Plane::Mask, x, 10) && fb.get(Plane::Mask, x, 15));
        }
        for y in 10..=15 {
            assert!(fb.get(Plane::Mask, 10, y) && fb.get(Plane::Mask, 20, y));
        }
        assert!(fb.plane(Plane::Level).iter().all(|&b| b == 0));
    }

    #[test]
    fn arrow_stays_near_its_anchor() {
        let mut fb = blank();
        Canvas::new(&mut fb, PAL).arrow(100, 100, 0., 4, Pen::WHITE);
        // Pointing up: the tip is 8 pixels above the anchor.
        assert!(fb.get(Plane::Mask, 100, 92) || fb.get(Plane::Mask, 100, 93));
        for y in 0..266 {
            for x in 0..352 {
                if fb.get(Plane::Mask, x, y) {
                    assert!((x as i32 - 100).abs() <= 8 && (y as i32 - 100).abs() <= 8);
                }
            }
        }
    }
}
